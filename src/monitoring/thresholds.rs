//! Threshold evaluation.
//!
//! Pure mapping from a metrics snapshot to zero or more alert
//! conditions. Output order is a contract consumed by message assembly:
//! CPU, memory, disks in enumeration order, then network.

use super::{AlertCondition, MetricsSnapshot};

/// Breach thresholds, all compared with strict `>`.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 85.0,
            memory_percent: 90.0,
            disk_percent: 70.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdEvaluator {
    thresholds: Thresholds,
}

impl ThresholdEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate one snapshot. Unavailable categories are skipped; every
    /// breach yields exactly one condition naming the metric, the
    /// observed value, and the threshold.
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> Vec<AlertCondition> {
        let mut conditions = Vec::new();

        if let Some(cpu) = snapshot.cpu_percent {
            if cpu > self.thresholds.cpu_percent {
                conditions.push(AlertCondition::new(format!(
                    "CPU usage is at {cpu:.1}% (threshold: {:.0}%)",
                    self.thresholds.cpu_percent
                )));
            }
        }

        if let Some(memory) = snapshot.memory_percent {
            if memory > self.thresholds.memory_percent {
                conditions.push(AlertCondition::new(format!(
                    "Memory usage is at {memory:.1}% (threshold: {:.0}%)",
                    self.thresholds.memory_percent
                )));
            }
        }

        if let Some(disks) = &snapshot.disks {
            for disk in disks {
                if disk.percent > self.thresholds.disk_percent {
                    conditions.push(AlertCondition::new(format!(
                        "Disk {} usage is at {:.1}% (threshold: {:.0}%)",
                        disk.device, disk.percent, self.thresholds.disk_percent
                    )));
                }
            }
        }

        if let Some(network) = snapshot.network {
            if network.errors > 0 || network.dropped > 0 {
                conditions.push(AlertCondition::new(format!(
                    "Network errors or dropped packets detected: {} errors, {} dropped",
                    network.errors, network.dropped
                )));
            }
        }

        conditions
    }
}
