//! Breakdown detection and caregiver escalation.
//!
//! The monitor keeps only the latest reading plus a running trigger count.
//! Every update re-evaluates the breakdown predicate; a positive result
//! escalates to the user's caregivers at most once per cooldown window.
//! Five seconds after an escalation the readings and trigger count are
//! cleared, while the cooldown keeps running from the escalation time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{
    Caregiver, ContactOutcome, DialOutcome, EscalationReport, EscalationStatus, Metrics,
    Notification,
};
use crate::reading::Reading;
use crate::risk;
use crate::transport::{tel_uri, CaregiverStore, Clock, Dialer, Notifier, SystemClock};

const EVENT_CAPACITY: usize = 16;

/// What a single update led to.
#[derive(Debug, Clone)]
pub enum Evaluation {
    Calm,
    /// Breakdown recognised while the cooldown is still running.
    Suppressed,
    Escalated(EscalationReport),
}

impl Evaluation {
    pub fn report(&self) -> Option<&EscalationReport> {
        match self {
            Evaluation::Escalated(report) => Some(report),
            _ => None,
        }
    }
}

enum Decision {
    Calm,
    Suppressed,
    Escalate {
        snapshot: Metrics,
        triggered_at: DateTime<Utc>,
    },
}

pub struct BreakdownMonitor {
    clock: Arc<dyn Clock>,
    metrics: Arc<Mutex<Metrics>>,
    escalator: Arc<Escalator>,
}

/// Everything the fan-out needs once it is detached from the caller.
struct Escalator {
    user_id: Uuid,
    store: Arc<dyn CaregiverStore>,
    notifier: Arc<dyn Notifier>,
    dialer: Arc<dyn Dialer>,
    metrics: Arc<Mutex<Metrics>>,
    pending_reset: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    events: broadcast::Sender<EscalationReport>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BreakdownMonitor {
    pub fn new(
        user_id: Uuid,
        store: Arc<dyn CaregiverStore>,
        notifier: Arc<dyn Notifier>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let metrics = Arc::new(Mutex::new(Metrics::default()));
        Self {
            clock: Arc::new(SystemClock),
            metrics: Arc::clone(&metrics),
            escalator: Arc::new(Escalator {
                user_id,
                store,
                notifier,
                dialer,
                metrics,
                pending_reset: Mutex::new(None),
                closed: AtomicBool::new(false),
                events,
            }),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.escalator.user_id
    }

    pub fn metrics(&self) -> Metrics {
        lock(&self.metrics).clone()
    }

    /// Receives a copy of every escalation report.
    pub fn subscribe(&self) -> broadcast::Receiver<EscalationReport> {
        self.escalator.events.subscribe()
    }

    /// Records a reading and escalates if it tips the user into a breakdown.
    ///
    /// Never fails: store and transport errors end up in the returned report.
    /// The fan-out runs on its own task, so dropping this future part way
    /// through still finishes the escalation and schedules the reset.
    pub async fn update_metrics(&self, reading: Reading) -> Evaluation {
        debug!(
            intensity = %reading.intensity,
            stress = %reading.stress,
            "updating metrics"
        );

        match self.apply(reading) {
            Decision::Calm => Evaluation::Calm,
            Decision::Suppressed => Evaluation::Suppressed,
            Decision::Escalate {
                snapshot,
                triggered_at,
            } => {
                let escalator = Arc::clone(&self.escalator);
                let fallback = escalator.blank_report(&snapshot, triggered_at);
                let task = tokio::spawn(async move { escalator.run(snapshot, triggered_at).await });
                match task.await {
                    Ok(report) => Evaluation::Escalated(report),
                    Err(err) => {
                        error!(error = %err, "escalation task failed");
                        self.escalator.schedule_reset();
                        Evaluation::Escalated(EscalationReport {
                            status: EscalationStatus::Failed,
                            ..fallback
                        })
                    }
                }
            }
        }
    }

    fn apply(&self, reading: Reading) -> Decision {
        let mut metrics = lock(&self.metrics);
        metrics.emotion_intensity = reading.intensity;
        metrics.stress_level = reading.stress;

        if risk::is_trigger(reading.intensity, reading.stress) {
            metrics.trigger_count = metrics.trigger_count.saturating_add(1);
            debug!(trigger_count = metrics.trigger_count, "trigger detected");
        }

        let breakdown = risk::is_breakdown(&metrics);
        debug!(
            intensity = %metrics.emotion_intensity,
            stress = %metrics.stress_level,
            trigger_count = metrics.trigger_count,
            breakdown,
            "breakdown check"
        );
        if !breakdown {
            return Decision::Calm;
        }

        let now = self.clock.now();
        if !risk::cooldown_elapsed(metrics.last_breakdown_at, now) {
            info!(
                last_breakdown_at = ?metrics.last_breakdown_at,
                "breakdown within cooldown, not escalating"
            );
            return Decision::Suppressed;
        }

        // Set before any await so overlapping updates hit the cooldown.
        metrics.last_breakdown_at = Some(now);
        Decision::Escalate {
            snapshot: metrics.clone(),
            triggered_at: now,
        }
    }

    /// Cancels a pending metrics reset. Further updates are still accepted,
    /// but escalations no longer schedule a reset.
    pub fn shutdown(&self) {
        self.escalator.closed.store(true, Ordering::SeqCst);
        self.escalator.cancel_reset();
    }
}

impl Drop for BreakdownMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Escalator {
    fn blank_report(&self, snapshot: &Metrics, triggered_at: DateTime<Utc>) -> EscalationReport {
        EscalationReport {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            triggered_at,
            emotion_intensity: snapshot.emotion_intensity,
            stress_level: snapshot.stress_level,
            trigger_count: snapshot.trigger_count,
            status: EscalationStatus::NoCaregivers,
            contacts: Vec::new(),
        }
    }

    async fn run(&self, snapshot: Metrics, triggered_at: DateTime<Utc>) -> EscalationReport {
        let report = self.escalate(self.blank_report(&snapshot, triggered_at)).await;
        self.schedule_reset();
        // No subscribers is fine.
        let _ = self.events.send(report.clone());
        report
    }

    async fn escalate(&self, mut report: EscalationReport) -> EscalationReport {
        info!(user_id = %self.user_id, "breakdown detected, notifying caregivers");

        let caregivers = match self.store.fetch_caregivers(self.user_id).await {
            Ok(Some(caregivers)) if !caregivers.is_empty() => caregivers,
            Ok(Some(_)) => {
                info!(user_id = %self.user_id, "no caregivers on file");
                return report;
            }
            Ok(None) => {
                info!(user_id = %self.user_id, "no user record found");
                return report;
            }
            Err(err) => {
                error!(user_id = %self.user_id, error = %err, "failed to load caregivers");
                report.status = EscalationStatus::StoreUnavailable;
                return report;
            }
        };

        for caregiver in caregivers {
            let outcome = self.contact(caregiver).await;
            report.contacts.push(outcome);
        }
        report.status = overall_status(&report.contacts);
        info!(
            escalation_id = %report.id,
            status = report.status.as_str(),
            contacts = report.contacts.len(),
            "escalation finished"
        );
        report
    }

    async fn contact(&self, caregiver: Caregiver) -> ContactOutcome {
        debug!(caregiver = %caregiver.email, "sending breakdown alert");

        if let Err(err) = self.notifier.schedule(breakdown_alert(&caregiver)).await {
            warn!(caregiver = %caregiver.email, error = %err, "failed to notify caregiver");
            return ContactOutcome {
                caregiver,
                notification_error: Some(err.to_string()),
                dial: DialOutcome::Skipped,
            };
        }

        let dial = if caregiver.phone.trim().is_empty() {
            debug!(caregiver = %caregiver.email, "no phone number, skipping call");
            DialOutcome::Skipped
        } else {
            match self.dialer.open_dialer(&tel_uri(&caregiver.phone)).await {
                Ok(()) => DialOutcome::Dialed,
                Err(err) => {
                    warn!(caregiver = %caregiver.email, error = %err, "failed to call caregiver");
                    DialOutcome::Failed(err.to_string())
                }
            }
        };

        ContactOutcome {
            caregiver,
            notification_error: None,
            dial,
        }
    }

    // The reset overwrites whatever arrived during the delay.
    fn schedule_reset(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let metrics = Arc::clone(&self.metrics);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(risk::METRICS_RESET_DELAY).await;
            let mut metrics = lock(&metrics);
            let last_breakdown_at = metrics.last_breakdown_at;
            *metrics = Metrics {
                last_breakdown_at,
                ..Metrics::default()
            };
            debug!("metrics reset");
        });

        if let Some(stale) = lock(&self.pending_reset).replace(handle) {
            stale.abort();
        }
    }

    fn cancel_reset(&self) {
        if let Some(handle) = lock(&self.pending_reset).take() {
            handle.abort();
            debug!("pending metrics reset cancelled");
        }
    }
}

fn breakdown_alert(caregiver: &Caregiver) -> Notification {
    Notification {
        title: "Breakdown Alert".to_string(),
        body: "A user you care for is experiencing a breakdown. Please check on them.".to_string(),
        data: json!({
            "caregiver": {
                "name": caregiver.name,
                "phone": caregiver.phone,
                "email": caregiver.email,
            }
        }),
    }
}

fn overall_status(contacts: &[ContactOutcome]) -> EscalationStatus {
    let succeeded = contacts.iter().filter(|c| c.is_success()).count();
    if contacts.is_empty() {
        EscalationStatus::NoCaregivers
    } else if succeeded == contacts.len() {
        EscalationStatus::Delivered
    } else if succeeded == 0 {
        EscalationStatus::Failed
    } else {
        EscalationStatus::PartialFailure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Level;
    use crate::transport::{ManualClock, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;
    use tokio::sync::Notify;
    use tokio::time::timeout;

    struct MemoryStore {
        caregivers: Option<Vec<Caregiver>>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        fn with(caregivers: Vec<Caregiver>) -> Self {
            Self {
                caregivers: Some(caregivers),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CaregiverStore for MemoryStore {
        async fn fetch_caregivers(&self, _user_id: Uuid) -> anyhow::Result<Option<Vec<Caregiver>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(self.caregivers.clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        reject_email: Option<String>,
        // Holds every delivery until released.
        gate: Option<Arc<Notify>>,
    }

    impl RecordingNotifier {
        fn gated(gate: &Arc<Notify>) -> Self {
            Self {
                gate: Some(Arc::clone(gate)),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn schedule(&self, notification: Notification) -> Result<(), TransportError> {
            let email = notification.data["caregiver"]["email"].as_str().map(str::to_string);
            if email.is_some() && email == self.reject_email {
                return Err(TransportError::Notification("permission denied".to_string()));
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            lock(&self.sent).push(notification);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDialer {
        dialed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Dialer for RecordingDialer {
        async fn open_dialer(&self, uri: &str) -> Result<(), TransportError> {
            lock(&self.dialed).push(uri.to_string());
            Ok(())
        }
    }

    struct Harness {
        monitor: Arc<BreakdownMonitor>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        dialer: Arc<RecordingDialer>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new(store: MemoryStore) -> Self {
            Self::with_notifier(store, RecordingNotifier::default())
        }

        fn with_notifier(store: MemoryStore, notifier: RecordingNotifier) -> Self {
            let store = Arc::new(store);
            let notifier = Arc::new(notifier);
            let dialer = Arc::new(RecordingDialer::default());
            let clock = Arc::new(ManualClock::new(Utc::now()));
            let monitor = BreakdownMonitor::new(
                Uuid::new_v4(),
                store.clone(),
                notifier.clone(),
                dialer.clone(),
            )
            .with_clock(clock.clone());
            Self {
                monitor: Arc::new(monitor),
                store,
                notifier,
                dialer,
                clock,
            }
        }

        async fn update(&self, intensity: u8, stress: u8) -> Evaluation {
            self.monitor
                .update_metrics(Reading::new(level(intensity), level(stress)))
                .await
        }

        fn notifications(&self) -> usize {
            lock(&self.notifier.sent).len()
        }

        fn dials(&self) -> Vec<String> {
            lock(&self.dialer.dialed).clone()
        }
    }

    fn level(value: u8) -> Level {
        Level::percent(value)
    }

    fn caregiver(name: &str, phone: &str, email: &str) -> Caregiver {
        Caregiver {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        }
    }

    fn jordan() -> Caregiver {
        caregiver("Jordan", "+15550100", "jordan@example.com")
    }

    async fn wait_for_reset() {
        tokio::time::sleep(risk::METRICS_RESET_DELAY + StdDuration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn readings_overwrite_without_smoothing() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        h.update(10, 20).await;
        h.update(30, 40).await;

        let metrics = h.monitor.metrics();
        assert_eq!(metrics.emotion_intensity, level(30));
        assert_eq!(metrics.stress_level, level(40));
        assert_eq!(metrics.trigger_count, 0);
        assert!(metrics.last_breakdown_at.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_monitor_escalates_on_high_intensity() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));

        let evaluation = h.update(75, 10).await;

        let report = evaluation.report().expect("should escalate");
        assert_eq!(report.status, EscalationStatus::Delivered);
        assert_eq!(h.notifications(), 1);
        assert_eq!(h.dials(), vec!["tel:+15550100".to_string()]);
        assert_eq!(h.monitor.metrics().last_breakdown_at, Some(h.clock.now()));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_triggers_escalate_on_second_reading() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));

        assert!(matches!(h.update(65, 65).await, Evaluation::Calm));
        assert!(matches!(h.update(65, 65).await, Evaluation::Escalated(_)));
        assert!(matches!(h.update(65, 65).await, Evaluation::Suppressed));

        assert_eq!(h.monitor.metrics().trigger_count, 3);
        assert_eq!(h.notifications(), 1);
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_suppresses_second_escalation_until_reset() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        h.update(75, 10).await;
        let escalated_at = h.monitor.metrics().last_breakdown_at;

        assert!(matches!(h.update(90, 90).await, Evaluation::Suppressed));
        assert_eq!(h.notifications(), 1);
        assert_eq!(h.monitor.metrics().trigger_count, 2);

        wait_for_reset().await;

        let metrics = h.monitor.metrics();
        assert_eq!(metrics.trigger_count, 0);
        assert_eq!(metrics.emotion_intensity, Level::ZERO);
        assert_eq!(metrics.stress_level, Level::ZERO);
        assert_eq!(metrics.last_breakdown_at, escalated_at);

        // Still inside the cooldown after the reset.
        assert!(matches!(h.update(95, 95).await, Evaluation::Suppressed));
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn escalates_again_once_cooldown_elapses() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        h.update(80, 0).await;
        wait_for_reset().await;

        h.clock.advance(chrono::Duration::minutes(29));
        assert!(matches!(h.update(80, 0).await, Evaluation::Suppressed));

        h.clock.advance(chrono::Duration::minutes(1));
        assert!(matches!(h.update(80, 0).await, Evaluation::Escalated(_)));
        assert_eq!(h.notifications(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn suppressed_breakdowns_keep_compounding_triggers() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        h.update(75, 10).await;
        wait_for_reset().await;

        for _ in 0..4 {
            h.update(65, 0).await;
        }
        assert_eq!(h.monitor.metrics().trigger_count, 4);

        h.clock.advance(chrono::Duration::minutes(30));
        // A calm reading still escalates on the stale count.
        assert!(matches!(h.update(10, 10).await, Evaluation::Escalated(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_phone_skips_dial_only() {
        let h = Harness::new(MemoryStore::with(vec![caregiver("Sam", "", "s@x.com")]));

        let evaluation = h.update(75, 10).await;

        let report = evaluation.report().expect("should escalate");
        assert_eq!(report.status, EscalationStatus::Delivered);
        assert_eq!(report.contacts[0].dial, DialOutcome::Skipped);
        assert_eq!(h.notifications(), 1);
        assert!(h.dials().is_empty());
        let sent = lock(&h.notifier.sent);
        assert_eq!(sent[0].title, "Breakdown Alert");
        assert_eq!(sent[0].data["caregiver"]["name"], "Sam");
    }

    #[tokio::test(start_paused = true)]
    async fn no_caregivers_means_no_calls() {
        let h = Harness::new(MemoryStore::with(Vec::new()));
        let evaluation = h.update(99, 99).await;
        assert_eq!(
            evaluation.report().map(|r| r.status),
            Some(EscalationStatus::NoCaregivers)
        );
        assert_eq!(h.notifications(), 0);
        assert!(h.dials().is_empty());

        let missing_user = Harness::new(MemoryStore {
            caregivers: None,
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let evaluation = missing_user.update(99, 99).await;
        assert_eq!(
            evaluation.report().map(|r| r.status),
            Some(EscalationStatus::NoCaregivers)
        );
        assert_eq!(missing_user.notifications(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_is_reported_not_raised() {
        let h = Harness::new(MemoryStore {
            caregivers: Some(vec![jordan()]),
            fail: true,
            calls: AtomicUsize::new(0),
        });

        let evaluation = h.update(75, 75).await;

        assert_eq!(
            evaluation.report().map(|r| r.status),
            Some(EscalationStatus::StoreUnavailable)
        );
        assert_eq!(h.notifications(), 0);
        assert!(h.monitor.metrics().last_breakdown_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_caregiver_does_not_block_the_rest() {
        let notifier = RecordingNotifier {
            reject_email: Some("jordan@example.com".to_string()),
            ..RecordingNotifier::default()
        };
        let h = Harness::with_notifier(
            MemoryStore::with(vec![jordan(), caregiver("Riley", "5550199", "riley@example.com")]),
            notifier,
        );

        let evaluation = h.update(75, 10).await;

        let report = evaluation.report().expect("should escalate");
        assert_eq!(report.status, EscalationStatus::PartialFailure);
        assert!(report.contacts[0].notification_error.is_some());
        assert_eq!(report.contacts[0].dial, DialOutcome::Skipped);
        assert_eq!(report.contacts[1].dial, DialOutcome::Dialed);
        assert_eq!(h.dials(), vec!["tel:5550199".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_reset() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        h.update(75, 10).await;

        h.monitor.shutdown();
        wait_for_reset().await;

        let metrics = h.monitor.metrics();
        assert_eq!(metrics.trigger_count, 1);
        assert_eq!(metrics.emotion_intensity, level(75));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_fires_when_caller_gives_up_mid_escalation() {
        let gate = Arc::new(Notify::new());
        let h = Harness::with_notifier(
            MemoryStore::with(vec![jordan()]),
            RecordingNotifier::gated(&gate),
        );

        let first = timeout(StdDuration::from_secs(1), h.update(65, 0)).await;
        assert!(matches!(first, Ok(Evaluation::Calm)));
        let second = timeout(StdDuration::from_secs(1), h.update(65, 0)).await;
        assert!(second.is_err(), "fan-out should still be held by the notifier");
        assert_eq!(h.monitor.metrics().trigger_count, 2);

        gate.notify_one();
        wait_for_reset().await;

        let metrics = h.monitor.metrics();
        assert_eq!(h.notifications(), 1);
        assert_eq!(h.dials(), vec!["tel:+15550100".to_string()]);
        assert_eq!(metrics.trigger_count, 0);
        assert_eq!(metrics.emotion_intensity, level(0));
        assert!(metrics.last_breakdown_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn update_during_fan_out_is_suppressed() {
        let gate = Arc::new(Notify::new());
        let h = Harness::with_notifier(
            MemoryStore::with(vec![jordan()]),
            RecordingNotifier::gated(&gate),
        );

        let monitor = Arc::clone(&h.monitor);
        let first = tokio::spawn(async move {
            monitor
                .update_metrics(Reading::new(level(75), level(10)))
                .await
        });
        while h.store.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert!(matches!(h.update(90, 90).await, Evaluation::Suppressed));

        gate.notify_one();
        let evaluation = first.await.expect("first update should finish");
        let report = evaluation.report().expect("first update should escalate");
        assert_eq!(report.status, EscalationStatus::Delivered);
        assert_eq!(h.store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifications(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_count_saturates() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        lock(&h.monitor.metrics).trigger_count = u32::MAX;

        h.update(65, 0).await;

        assert_eq!(h.monitor.metrics().trigger_count, u32::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_receive_reports() {
        let h = Harness::new(MemoryStore::with(vec![jordan()]));
        let mut events = h.monitor.subscribe();

        h.update(75, 10).await;

        let report = events.try_recv().expect("report should be broadcast");
        assert_eq!(report.user_id, h.monitor.user_id());
        assert_eq!(report.emotion_intensity, level(75));
        assert_eq!(report.trigger_count, 1);
    }

    #[test]
    fn overall_status_classifies_outcomes() {
        let ok = ContactOutcome {
            caregiver: jordan(),
            notification_error: None,
            dial: DialOutcome::Dialed,
        };
        let failed = ContactOutcome {
            dial: DialOutcome::Failed("busy".to_string()),
            ..ok.clone()
        };
        assert_eq!(overall_status(&[]), EscalationStatus::NoCaregivers);
        assert_eq!(overall_status(&[ok.clone()]), EscalationStatus::Delivered);
        assert_eq!(overall_status(&[failed.clone()]), EscalationStatus::Failed);
        assert_eq!(overall_status(&[ok, failed]), EscalationStatus::PartialFailure);
    }
}
