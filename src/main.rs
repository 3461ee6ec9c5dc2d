use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostwatch::config;
use hostwatch::monitoring::{AlertDebouncer, AlertState, MetricsCollector, ThresholdEvaluator};
use hostwatch::notify::{EmailNotifier, NotificationDispatcher, Notifier, SmsNotifier};
use hostwatch::scheduler::{Monitor, MonitorScheduler, SchedulerConfig};
use hostwatch::store::ConfigStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file if present

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration is entirely file-driven; a missing or unparseable
    // record is the only fatal startup path.
    let path = config::config_path();
    let store = ConfigStore::new(path.clone());
    let record = store.load()?;
    record.validate()?;
    info!(path = %path.display(), "configuration loaded");

    let notification = record.notification_config();
    let email = EmailNotifier::new(&notification.email)?;
    let sms = SmsNotifier::new(notification.sms.clone());
    let dispatcher = NotificationDispatcher::new(
        vec![Arc::new(email) as Arc<dyn Notifier>, Arc::new(sms)],
        notification.send_timeout,
    );

    let monitor = Arc::new(Monitor::new(
        MetricsCollector::new(record.cpu_sample_window()),
        ThresholdEvaluator::default(),
        AlertDebouncer::new(record.cooldown()),
        AlertState {
            last_alert_time: record.last_alert_time,
        },
        dispatcher,
        store,
    ));

    let mut scheduler = MonitorScheduler::new(
        monitor,
        SchedulerConfig {
            alert_cron: record.alert_cron.clone(),
            report_crons: record.report_crons.clone(),
        },
    )
    .await?;
    scheduler.start().await?;

    // Runs until the process is told to stop; there is no other exit.
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    scheduler.shutdown().await?;
    Ok(())
}
