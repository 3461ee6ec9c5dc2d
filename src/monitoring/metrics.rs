//! Host metrics collection.
//!
//! Wraps a reusable `sysinfo` handle set so repeated cycles do not
//! reallocate the system tables. Each metric category is collected
//! independently: a failure degrades that category to unavailable for
//! the cycle and is recorded in the snapshot's diagnostics instead of
//! aborting the sample.

use chrono::Utc;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};
use tracing::warn;

use super::{DiskUsage, MetricsSnapshot, NetworkCounters};
use crate::error::CollectionError;

pub struct MetricsCollector {
    sys: System,
    disks: Disks,
    networks: Networks,
    cpu_window: Duration,
}

impl MetricsCollector {
    /// `cpu_window` is the fixed interval CPU usage is measured over.
    /// Every call to [`sample`](Self::sample) blocks for this long; the
    /// scheduler's overlap guard accounts for it.
    pub fn new(cpu_window: Duration) -> Self {
        let mut sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        // Prime the CPU baseline so the first window reads a delta.
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            cpu_window,
        }
    }

    /// Take one snapshot. This is the only intentional blocking point in
    /// a cycle: the CPU reading brackets a sleep of `cpu_window`.
    pub async fn sample(&mut self) -> MetricsSnapshot {
        let taken_at = Utc::now();
        let mut diagnostics = Vec::new();

        let cpu_percent = self.sample_cpu(&mut diagnostics).await;
        let memory_percent = self.sample_memory(&mut diagnostics);
        let disks = self.sample_disks(&mut diagnostics);
        let network = self.sample_network(&mut diagnostics);

        for failure in &diagnostics {
            warn!(error = %failure, "metric category degraded to unavailable");
        }

        MetricsSnapshot {
            taken_at,
            cpu_percent,
            memory_percent,
            disks,
            network,
            diagnostics,
        }
    }

    async fn sample_cpu(&mut self, diagnostics: &mut Vec<CollectionError>) -> Option<f32> {
        self.sys.refresh_cpu();
        tokio::time::sleep(self.cpu_window).await;
        self.sys.refresh_cpu();

        let usage = self.sys.global_cpu_info().cpu_usage();
        if usage.is_finite() {
            Some(usage)
        } else {
            diagnostics.push(CollectionError::Cpu("non-finite usage reading".into()));
            None
        }
    }

    fn sample_memory(&mut self, diagnostics: &mut Vec<CollectionError>) -> Option<f32> {
        self.sys.refresh_memory();
        match self.sys.total_memory() {
            0 => {
                diagnostics.push(CollectionError::Memory(
                    "total memory reported as zero".into(),
                ));
                None
            }
            total => Some((self.sys.used_memory() as f64 / total as f64 * 100.0) as f32),
        }
    }

    fn sample_disks(&mut self, diagnostics: &mut Vec<CollectionError>) -> Option<Vec<DiskUsage>> {
        self.disks.refresh();
        if self.disks.list().is_empty() {
            self.disks.refresh_list();
        }

        let usage: Vec<DiskUsage> = self
            .disks
            .list()
            .iter()
            .filter_map(|disk| {
                let total = disk.total_space();
                if total == 0 {
                    return None;
                }
                let used = total.saturating_sub(disk.available_space());
                Some(DiskUsage {
                    device: disk.name().to_string_lossy().into_owned(),
                    percent: (used as f64 / total as f64 * 100.0) as f32,
                })
            })
            .collect();

        if usage.is_empty() {
            diagnostics.push(CollectionError::Disk("no readable volumes".into()));
            None
        } else {
            Some(usage)
        }
    }

    fn sample_network(&mut self, diagnostics: &mut Vec<CollectionError>) -> Option<NetworkCounters> {
        self.networks.refresh_list();

        let mut counters = NetworkCounters {
            bytes_sent: 0,
            bytes_recv: 0,
            errors: 0,
            dropped: 0,
        };
        for data in self.networks.list().values() {
            counters.bytes_sent += data.total_transmitted();
            counters.bytes_recv += data.total_received();
            counters.errors +=
                data.total_errors_on_received() + data.total_errors_on_transmitted();
        }

        // sysinfo does not expose drop counters; read them from the
        // kernel directly where available.
        with_dropped_packets(counters, read_dropped_packets(), diagnostics)
    }
}

/// Merge the kernel drop counters into a network reading. A failed read
/// degrades the whole category: reporting `dropped: 0` when the counter
/// is unknown would let real drops slip past threshold evaluation.
fn with_dropped_packets(
    mut counters: NetworkCounters,
    dropped: std::io::Result<u64>,
    diagnostics: &mut Vec<CollectionError>,
) -> Option<NetworkCounters> {
    match dropped {
        Ok(dropped) => {
            counters.dropped = dropped;
            Some(counters)
        }
        Err(e) => {
            diagnostics.push(CollectionError::Network(format!(
                "dropped-packet counters unavailable: {e}"
            )));
            None
        }
    }
}

#[cfg(target_os = "linux")]
fn read_dropped_packets() -> std::io::Result<u64> {
    let stats = std::fs::read_to_string("/proc/net/dev")?;
    let mut dropped = 0u64;
    // Two header lines, then "iface: rx{bytes packets errs drop ...} tx{...}".
    for line in stats.lines().skip(2) {
        let Some((_, fields)) = line.split_once(':') else {
            continue;
        };
        let cols: Vec<u64> = fields
            .split_whitespace()
            .filter_map(|c| c.parse().ok())
            .collect();
        if cols.len() >= 16 {
            dropped = dropped.saturating_add(cols[3]).saturating_add(cols[11]);
        }
    }
    Ok(dropped)
}

#[cfg(not(target_os = "linux"))]
fn read_dropped_packets() -> std::io::Result<u64> {
    Ok(0)
}
