use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::reading::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caregiver {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    pub emotion_intensity: Level,
    pub stress_level: Level,
    pub trigger_count: u32,
    pub last_breakdown_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialOutcome {
    Dialed,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactOutcome {
    pub caregiver: Caregiver,
    pub notification_error: Option<String>,
    pub dial: DialOutcome,
}

impl ContactOutcome {
    pub fn is_success(&self) -> bool {
        self.notification_error.is_none() && !matches!(self.dial, DialOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationStatus {
    Delivered,
    PartialFailure,
    Failed,
    NoCaregivers,
    StoreUnavailable,
}

impl EscalationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EscalationStatus::Delivered => "delivered",
            EscalationStatus::PartialFailure => "partial_failure",
            EscalationStatus::Failed => "failed",
            EscalationStatus::NoCaregivers => "no_caregivers",
            EscalationStatus::StoreUnavailable => "store_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EscalationReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub triggered_at: DateTime<Utc>,
    pub emotion_intensity: Level,
    pub stress_level: Level,
    pub trigger_count: u32,
    pub status: EscalationStatus,
    pub contacts: Vec<ContactOutcome>,
}

#[derive(Debug, Clone)]
pub struct EscalationRecord {
    pub user_name: String,
    pub triggered_at: DateTime<Utc>,
    pub emotion_intensity: i16,
    pub stress_level: i16,
    pub trigger_count: i32,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct ContactRecord {
    pub caregiver_name: String,
    pub caregiver_email: String,
    pub notified: bool,
    pub dial: String,
}

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub status: String,
    pub count: usize,
}
