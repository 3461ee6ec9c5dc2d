pub mod debounce;
pub mod metrics;
pub mod report;
pub mod thresholds;

pub use debounce::{AlertDebouncer, AlertState};
pub use metrics::MetricsCollector;
pub use thresholds::{ThresholdEvaluator, Thresholds};

use chrono::{DateTime, Utc};

use crate::error::CollectionError;

/// One sampling pass over the host. Produced fresh each cycle, never
/// mutated afterwards. A category that failed to collect is `None` and
/// carries a matching entry in `diagnostics`.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub taken_at: DateTime<Utc>,
    pub cpu_percent: Option<f32>,
    pub memory_percent: Option<f32>,
    pub disks: Option<Vec<DiskUsage>>,
    pub network: Option<NetworkCounters>,
    pub diagnostics: Vec<CollectionError>,
}

/// Usage of one mounted volume, in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskUsage {
    pub device: String,
    pub percent: f32,
}

/// Cumulative interface counters summed across all interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub errors: u64,
    pub dropped: u64,
}

/// A single breached threshold, already rendered human-readable with the
/// metric name, observed value, and threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCondition {
    pub message: String,
}

impl AlertCondition {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
