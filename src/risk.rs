use chrono::{DateTime, Duration, Utc};

use crate::models::Metrics;
use crate::reading::Level;

/// Either level strictly above this signals a breakdown on its own.
pub const BREAKDOWN_THRESHOLD: Level = Level::percent(70);
/// A reading with either level strictly above this counts as one trigger.
pub const TRIGGER_SUBTHRESHOLD: Level = Level::percent(60);
pub const TRIGGER_COUNT_THRESHOLD: u32 = 2;

pub const COOLDOWN_SECS: i64 = 30 * 60;
pub const METRICS_RESET_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

pub fn cooldown() -> Duration {
    Duration::seconds(COOLDOWN_SECS)
}

pub fn is_trigger(intensity: Level, stress: Level) -> bool {
    intensity > TRIGGER_SUBTHRESHOLD || stress > TRIGGER_SUBTHRESHOLD
}

// Strict on the level legs, inclusive on the count leg.
pub fn is_breakdown(metrics: &Metrics) -> bool {
    metrics.emotion_intensity > BREAKDOWN_THRESHOLD
        || metrics.stress_level > BREAKDOWN_THRESHOLD
        || metrics.trigger_count >= TRIGGER_COUNT_THRESHOLD
}

pub fn cooldown_elapsed(last_breakdown_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_breakdown_at {
        None => true,
        Some(last) => now - last >= cooldown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(value: u8) -> Level {
        Level::percent(value)
    }

    fn metrics(intensity: u8, stress: u8, trigger_count: u32) -> Metrics {
        Metrics {
            emotion_intensity: level(intensity),
            stress_level: level(stress),
            trigger_count,
            last_breakdown_at: None,
        }
    }

    #[test]
    fn level_legs_are_strict() {
        assert!(!is_breakdown(&metrics(70, 70, 0)));
        assert!(is_breakdown(&metrics(71, 0, 0)));
        assert!(is_breakdown(&metrics(0, 71, 0)));
    }

    #[test]
    fn trigger_count_leg_is_inclusive() {
        assert!(!is_breakdown(&metrics(10, 10, 1)));
        assert!(is_breakdown(&metrics(10, 10, 2)));
    }

    #[test]
    fn triggers_need_either_level_above_sixty() {
        assert!(!is_trigger(level(60), level(60)));
        assert!(is_trigger(level(61), level(0)));
        assert!(is_trigger(level(0), level(61)));
    }

    #[test]
    fn cooldown_gates_on_thirty_minutes() {
        let now = Utc::now();
        assert!(cooldown_elapsed(None, now));
        assert!(!cooldown_elapsed(Some(now - Duration::minutes(29)), now));
        assert!(cooldown_elapsed(Some(now - Duration::minutes(30)), now));
        assert!(cooldown_elapsed(Some(now - Duration::hours(2)), now));
    }
}
