//! End-to-end alert cycle tests: evaluation through debounce,
//! persistence, and dispatch, with fake channels and a temp-file config
//! store. No wall-clock waits, no live network.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use hostwatch::monitoring::{
    report, AlertDebouncer, AlertState, MetricsCollector, MetricsSnapshot, NetworkCounters,
    ThresholdEvaluator, Thresholds,
};
use hostwatch::notify::{NotificationDispatcher, Notifier};
use hostwatch::scheduler::Monitor;
use hostwatch::store::ConfigStore;
use hostwatch::ChannelError;

struct RecordingNotifier {
    name: &'static str,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _subject: &str, _body: &str) -> Result<(), ChannelError> {
        Err(ChannelError::new("email", "relay unreachable"))
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

const SEED_RECORD: &str = r#"{
    "mail_host": "smtp.example.com",
    "mail_username": "monitor",
    "mail_password": "secret",
    "from_email": "monitor@example.com",
    "to_email": "ops@example.com",
    "sms_account_id": "AC123",
    "sms_auth_token": "token",
    "sms_from_number": "+15550100",
    "sms_to_number": "+15550199",
    "last_alert_time": null
}"#;

fn seeded_store(dir: &TempDir) -> ConfigStore {
    let path = dir.path().join("hostwatch.json");
    std::fs::write(&path, SEED_RECORD).unwrap();
    ConfigStore::new(path)
}

fn cpu_95_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        taken_at: Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap(),
        cpu_percent: Some(95.0),
        memory_percent: Some(50.0),
        disks: Some(Vec::new()),
        network: Some(NetworkCounters {
            bytes_sent: 0,
            bytes_recv: 0,
            errors: 0,
            dropped: 0,
        }),
        diagnostics: Vec::new(),
    }
}

/// The scenario from the design brief: CPU at 95 %, everything else
/// quiet, no prior alert state. Exactly one condition, the gate opens,
/// both channels are attempted, and the persisted timestamp matches the
/// evaluation time.
#[tokio::test]
async fn first_cpu_breach_dispatches_on_both_channels_and_persists() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);

    let evaluator = ThresholdEvaluator::new(Thresholds::default());
    let conditions = evaluator.evaluate(&cpu_95_snapshot());
    assert_eq!(conditions.len(), 1);
    assert!(conditions[0].message.contains("CPU usage is at 95.0%"));

    let debouncer = AlertDebouncer::new(chrono::Duration::hours(1));
    let mut state = AlertState::default();
    let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 1).unwrap();
    assert!(debouncer.should_dispatch(&mut state, &conditions, now));
    store.update_last_alert(now).unwrap();

    let email = RecordingNotifier::new("email");
    let sms = RecordingNotifier::new("sms");
    let dispatcher = NotificationDispatcher::new(
        vec![
            email.clone() as Arc<dyn Notifier>,
            sms.clone() as Arc<dyn Notifier>,
        ],
        Duration::from_secs(5),
    );

    let text = report::format_alert(&conditions, now);
    let outcomes = dispatcher.send_alert(&text).await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(email.sent_count(), 1);
    assert_eq!(sms.sent_count(), 1);

    // State survives a "restart": reload from disk.
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.last_alert_time, Some(now));
}

#[tokio::test]
async fn one_failed_channel_reports_partial_success() {
    let sms = RecordingNotifier::new("sms");
    let dispatcher = NotificationDispatcher::new(
        vec![
            Arc::new(FailingNotifier) as Arc<dyn Notifier>,
            sms.clone() as Arc<dyn Notifier>,
        ],
        Duration::from_secs(5),
    );

    let outcomes = dispatcher.send_alert("disk is full").await;
    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    let failures = outcomes.iter().filter(|o| !o.is_success()).count();
    assert_eq!(successes, 1);
    assert_eq!(failures, 1);
    assert_eq!(sms.sent_count(), 1);
}

/// Full monitor cycle against the real sampler, with thresholds forced
/// low enough that any host breaches them: the first cycle dispatches,
/// the second is suppressed by the cooldown.
#[tokio::test]
async fn monitor_dispatches_then_suppresses_within_cooldown() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir);
    let store_path = store.path().to_path_buf();

    let email = RecordingNotifier::new("email");
    let dispatcher = NotificationDispatcher::new(
        vec![email.clone() as Arc<dyn Notifier>],
        Duration::from_secs(5),
    );

    let always_breaching = Thresholds {
        cpu_percent: -1.0,
        memory_percent: -1.0,
        disk_percent: -1.0,
    };
    let monitor = Monitor::new(
        MetricsCollector::new(Duration::from_millis(20)),
        ThresholdEvaluator::new(always_breaching),
        AlertDebouncer::new(chrono::Duration::hours(1)),
        AlertState::default(),
        dispatcher,
        store,
    );

    monitor.run_alert_cycle().await;
    monitor.run_alert_cycle().await;

    let stats = monitor.alert_statistics().await;
    assert_eq!(stats.completed_runs, 2);
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.suppressed, 1);
    assert_eq!(email.sent_count(), 1);

    // The debounce decision was persisted before dispatch.
    let reloaded = ConfigStore::new(store_path).load().unwrap();
    assert_eq!(reloaded.last_alert_time, monitor.last_alert_time().await);
    assert!(reloaded.last_alert_time.is_some());
}

/// A failed state write is degraded mode, not a reason to swallow the
/// alert: the decided dispatch still goes out.
#[tokio::test]
async fn persistence_failure_does_not_block_the_decided_dispatch() {
    let dir = TempDir::new().unwrap();
    // Store points at a file that does not exist.
    let store = ConfigStore::new(dir.path().join("missing.json"));

    let email = RecordingNotifier::new("email");
    let dispatcher = NotificationDispatcher::new(
        vec![email.clone() as Arc<dyn Notifier>],
        Duration::from_secs(5),
    );

    let always_breaching = Thresholds {
        cpu_percent: -1.0,
        memory_percent: -1.0,
        disk_percent: -1.0,
    };
    let monitor = Monitor::new(
        MetricsCollector::new(Duration::from_millis(20)),
        ThresholdEvaluator::new(always_breaching),
        AlertDebouncer::new(chrono::Duration::hours(1)),
        AlertState::default(),
        dispatcher,
        store,
    );

    monitor.run_alert_cycle().await;

    assert_eq!(monitor.alert_statistics().await.dispatched, 1);
    assert_eq!(email.sent_count(), 1);
}
