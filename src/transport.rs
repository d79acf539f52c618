//! Collaborator seams for the monitor: caregiver lookup, notification
//! delivery, dialing and wall-clock time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{Caregiver, Notification};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("notification rejected: {0}")]
    Notification(String),

    #[error("dialer unavailable: {0}")]
    Dial(String),
}

#[async_trait]
pub trait CaregiverStore: Send + Sync {
    /// `Ok(None)` means no record exists for the user.
    async fn fetch_caregivers(&self, user_id: Uuid) -> anyhow::Result<Option<Vec<Caregiver>>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn schedule(&self, notification: Notification) -> Result<(), TransportError>;
}

#[async_trait]
pub trait Dialer: Send + Sync {
    async fn open_dialer(&self, uri: &str) -> Result<(), TransportError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn tel_uri(phone: &str) -> String {
    format!("tel:{}", phone.trim())
}

/// Notifier used by the CLI: records each alert in the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn schedule(&self, notification: Notification) -> Result<(), TransportError> {
        if notification.title.trim().is_empty() {
            return Err(TransportError::Notification("missing title".to_string()));
        }
        info!(
            title = %notification.title,
            data = %notification.data,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Dialer used by the CLI: logs the number that would be dialed.
pub struct LogDialer;

#[async_trait]
impl Dialer for LogDialer {
    async fn open_dialer(&self, uri: &str) -> Result<(), TransportError> {
        if !uri.starts_with("tel:") {
            return Err(TransportError::Dial(format!("unsupported uri {uri}")));
        }
        info!(%uri, "opening dialer");
        Ok(())
    }
}
