use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ReadingError {
    #[error("{field} must be between 0 and 100, got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} is not a number")]
    NotANumber { field: &'static str },
}

/// A percentage reading on the closed range 0..=100.
///
/// Deserializes from a number and rejects anything `Level::parse` would.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "f64")]
pub struct Level(u8);

impl Level {
    pub const ZERO: Level = Level(0);
    pub const MAX: Level = Level(100);

    /// Values above 100 saturate at 100.
    pub const fn percent(value: u8) -> Level {
        if value > Level::MAX.0 {
            Level::MAX
        } else {
            Level(value)
        }
    }

    /// Rounds to the nearest whole percent and rejects anything outside 0..=100.
    pub fn parse(field: &'static str, value: f64) -> Result<Level, ReadingError> {
        if value.is_nan() {
            return Err(ReadingError::NotANumber { field });
        }
        let rounded = value.round();
        if !(0.0..=100.0).contains(&rounded) {
            return Err(ReadingError::OutOfRange { field, value });
        }
        Ok(Level(rounded as u8))
    }

    /// Clamps into 0..=100; NaN maps to zero.
    pub fn saturating(value: f64) -> Level {
        if value.is_nan() {
            return Level::ZERO;
        }
        Level(value.round().clamp(0.0, f64::from(Level::MAX.0)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<f64> for Level {
    type Error = ReadingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Level::parse("level", value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Reading {
    pub intensity: Level,
    pub stress: Level,
}

impl Reading {
    pub fn new(intensity: Level, stress: Level) -> Self {
        Self { intensity, stress }
    }

    /// Builds a reading from 0..=10 scores, as produced by the tracking screen.
    pub fn from_scaled(intensity: f64, stress: f64) -> Self {
        Self {
            intensity: Level::saturating(intensity * 10.0),
            stress: Level::saturating(stress * 10.0),
        }
    }
}
