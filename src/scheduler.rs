//! Cycle scheduling.
//!
//! Two independent timer families drive the agent: the alert cycle
//! (sample, evaluate, debounce, dispatch) and the report cycle (sample,
//! format, dispatch unconditionally). Each cycle type refuses to
//! overlap with itself; a tick that fires while the previous tick of the
//! same type is still running is skipped and counted. Alert and report
//! cycles may run concurrently with each other.

use anyhow::{anyhow, Result};
use chrono::{Local, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

use crate::monitoring::{
    report, AlertDebouncer, AlertState, MetricsCollector, ThresholdEvaluator,
};
use crate::notify::NotificationDispatcher;
use crate::store::ConfigStore;

/// Per-cycle-type run accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStatistics {
    pub completed_runs: u64,
    pub skipped_runs: u64,
    pub dispatched: u64,
    pub suppressed: u64,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub alert_cron: String,
    pub report_crons: Vec<String>,
}

/// The component graph for one host: sampler, evaluator, debouncer,
/// dispatcher, and the persisted alert state. Cycle bodies live here so
/// tests can invoke them directly without waiting on wall-clock
/// triggers.
pub struct Monitor {
    collector: Mutex<MetricsCollector>,
    evaluator: ThresholdEvaluator,
    debouncer: AlertDebouncer,
    alert_state: Mutex<AlertState>,
    dispatcher: NotificationDispatcher,
    store: ConfigStore,
    alert_guard: Mutex<()>,
    report_guard: Mutex<()>,
    alert_stats: RwLock<CycleStatistics>,
    report_stats: RwLock<CycleStatistics>,
}

impl Monitor {
    pub fn new(
        collector: MetricsCollector,
        evaluator: ThresholdEvaluator,
        debouncer: AlertDebouncer,
        initial_state: AlertState,
        dispatcher: NotificationDispatcher,
        store: ConfigStore,
    ) -> Self {
        Self {
            collector: Mutex::new(collector),
            evaluator,
            debouncer,
            alert_state: Mutex::new(initial_state),
            dispatcher,
            store,
            alert_guard: Mutex::new(()),
            report_guard: Mutex::new(()),
            alert_stats: RwLock::new(CycleStatistics::default()),
            report_stats: RwLock::new(CycleStatistics::default()),
        }
    }

    /// One alert cycle: sample, evaluate, debounce, dispatch if the gate
    /// opens. Never returns an error; every failure mode inside the
    /// cycle is logged and the next tick proceeds normally.
    pub async fn run_alert_cycle(&self) {
        let _guard = match self.alert_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("previous alert cycle still running, skipping this tick");
                self.alert_stats.write().await.skipped_runs += 1;
                return;
            }
        };

        let snapshot = {
            let mut collector = self.collector.lock().await;
            collector.sample().await
        };

        let conditions = self.evaluator.evaluate(&snapshot);
        if conditions.is_empty() {
            debug!("all metrics within thresholds");
            self.alert_stats.write().await.completed_runs += 1;
            return;
        }

        let now = Utc::now();
        let dispatch = {
            let mut state = self.alert_state.lock().await;
            let open = self.debouncer.should_dispatch(&mut state, &conditions, now);
            if open {
                // Persist before dispatch so a crash right after sending
                // cannot re-dispatch the same conditions next cycle.
                if let Err(e) = self.store.update_last_alert(now) {
                    error!(
                        error = %e,
                        "failed to persist alert state; a later cycle may re-dispatch within the cooldown"
                    );
                }
            }
            open
        };

        if dispatch {
            let text = report::format_alert(&conditions, now);
            let outcomes = self.dispatcher.send_alert(&text).await;
            let failures = outcomes.iter().filter(|o| !o.is_success()).count();
            info!(
                conditions = conditions.len(),
                channels = outcomes.len(),
                failures,
                "alert dispatched"
            );
            let mut stats = self.alert_stats.write().await;
            stats.dispatched += 1;
            stats.completed_runs += 1;
        } else {
            info!(
                conditions = conditions.len(),
                "alert suppressed within cooldown window"
            );
            let mut stats = self.alert_stats.write().await;
            stats.suppressed += 1;
            stats.completed_runs += 1;
        }
    }

    /// One report cycle: sample, format the full report, send it on
    /// every channel regardless of threshold state.
    pub async fn run_report_cycle(&self) {
        let _guard = match self.report_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("previous report cycle still running, skipping this tick");
                self.report_stats.write().await.skipped_runs += 1;
                return;
            }
        };

        let snapshot = {
            let mut collector = self.collector.lock().await;
            collector.sample().await
        };

        let body = report::format_report(&snapshot);
        let outcomes = self.dispatcher.send_report(&body).await;
        let failures = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(channels = outcomes.len(), failures, "report dispatched");

        let mut stats = self.report_stats.write().await;
        stats.dispatched += 1;
        stats.completed_runs += 1;
    }

    pub async fn alert_statistics(&self) -> CycleStatistics {
        *self.alert_stats.read().await
    }

    pub async fn report_statistics(&self) -> CycleStatistics {
        *self.report_stats.read().await
    }

    pub async fn last_alert_time(&self) -> Option<chrono::DateTime<Utc>> {
        self.alert_state.lock().await.last_alert_time
    }
}

/// Wires the monitor's cycle bodies onto cron triggers. The scheduler
/// runs until the process exits; `shutdown` exists for signal handling
/// and tests.
pub struct MonitorScheduler {
    scheduler: JobScheduler,
    monitor: Arc<Monitor>,
    config: SchedulerConfig,
}

impl MonitorScheduler {
    pub async fn new(monitor: Arc<Monitor>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("failed to initialize job scheduler: {e}"))?;
        Ok(Self {
            scheduler,
            monitor,
            config,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let monitor = self.monitor.clone();
        let alert_job = Job::new_async(self.config.alert_cron.as_str(), move |_uuid, _lock| {
            let monitor = monitor.clone();
            Box::pin(async move {
                monitor.run_alert_cycle().await;
            })
        })
        .map_err(|e| anyhow!("invalid alert schedule '{}': {e}", self.config.alert_cron))?;
        self.scheduler
            .add(alert_job)
            .await
            .map_err(|e| anyhow!("failed to add alert job: {e}"))?;

        for cron in &self.config.report_crons {
            let report_job = report_job(cron, self.monitor.clone())?;
            self.scheduler
                .add(report_job)
                .await
                .map_err(|e| anyhow!("failed to add report job: {e}"))?;
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("failed to start job scheduler: {e}"))?;

        info!(
            alert_cron = %self.config.alert_cron,
            report_schedules = self.config.report_crons.len(),
            "monitor scheduler started"
        );
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| anyhow!("failed to shut down job scheduler: {e}"))?;
        info!("monitor scheduler stopped");
        Ok(())
    }
}

/// Report times are wall-clock times on the host, so the cron expression
/// is evaluated in the local timezone rather than UTC.
fn report_job(cron: &str, monitor: Arc<Monitor>) -> Result<Job> {
    Job::new_async_tz(cron, Local, move |_uuid, _lock| {
        let monitor = monitor.clone();
        Box::pin(async move {
            monitor.run_report_cycle().await;
        })
    })
    .map_err(|e| anyhow!("invalid report schedule '{cron}': {e}"))
}
