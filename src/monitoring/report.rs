//! Message assembly for the full report and the alert text.

use chrono::{DateTime, Utc};

use super::{AlertCondition, MetricsSnapshot};

const TIMESTAMP_FORMAT: &str = "%B %d, %Y %H:%M:%S";

/// Render the periodic full report: timestamp header, CPU, memory,
/// per-device disk usage, and network totals. Unavailable categories
/// are stated as such rather than omitted.
pub fn format_report(snapshot: &MetricsSnapshot) -> String {
    let mut lines = Vec::with_capacity(5);
    lines.push(format!(
        "Time of Report: {}",
        snapshot.taken_at.format(TIMESTAMP_FORMAT)
    ));

    lines.push(match snapshot.cpu_percent {
        Some(cpu) => format!("CPU Usage: {cpu:.1}%"),
        None => "CPU Usage: unavailable".to_string(),
    });

    lines.push(match snapshot.memory_percent {
        Some(memory) => format!("Memory Usage: {memory:.1}%"),
        None => "Memory Usage: unavailable".to_string(),
    });

    lines.push(match &snapshot.disks {
        Some(disks) => {
            let rendered: Vec<String> = disks
                .iter()
                .map(|disk| format!("{}: {:.1}%", disk.device, disk.percent))
                .collect();
            format!("Disk Usage: {}", rendered.join(", "))
        }
        None => "Disk Usage: unavailable".to_string(),
    });

    lines.push(match snapshot.network {
        Some(network) => format!(
            "Network: Bytes Sent: {}, Bytes Received: {}, Errors: {}, Dropped: {}",
            network.bytes_sent, network.bytes_recv, network.errors, network.dropped
        ),
        None => "Network: unavailable".to_string(),
    });

    lines.join("\n")
}

/// Render the alert body: timestamp plus all condition messages joined
/// in evaluation order. The join order is reproducible because the
/// evaluator's output order is fixed.
pub fn format_alert(conditions: &[AlertCondition], at: DateTime<Utc>) -> String {
    let joined: Vec<&str> = conditions.iter().map(|c| c.message.as_str()).collect();
    format!("{} - {}", at.format(TIMESTAMP_FORMAT), joined.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::{DiskUsage, NetworkCounters};
    use chrono::TimeZone;

    #[test]
    fn report_includes_all_sections() {
        let snapshot = MetricsSnapshot {
            taken_at: Utc.with_ymd_and_hms(2026, 8, 25, 6, 0, 0).unwrap(),
            cpu_percent: Some(12.5),
            memory_percent: Some(48.0),
            disks: Some(vec![
                DiskUsage {
                    device: "/dev/sda1".into(),
                    percent: 33.3,
                },
                DiskUsage {
                    device: "/dev/sdb1".into(),
                    percent: 61.0,
                },
            ]),
            network: Some(NetworkCounters {
                bytes_sent: 1000,
                bytes_recv: 2000,
                errors: 0,
                dropped: 0,
            }),
            diagnostics: Vec::new(),
        };

        let report = format_report(&snapshot);
        assert!(report.starts_with("Time of Report: August 25, 2026 06:00:00"));
        assert!(report.contains("CPU Usage: 12.5%"));
        assert!(report.contains("Memory Usage: 48.0%"));
        assert!(report.contains("Disk Usage: /dev/sda1: 33.3%, /dev/sdb1: 61.0%"));
        assert!(report.contains("Bytes Sent: 1000"));
    }

    #[test]
    fn degraded_categories_read_as_unavailable() {
        let snapshot = MetricsSnapshot {
            taken_at: Utc::now(),
            cpu_percent: None,
            memory_percent: Some(50.0),
            disks: None,
            network: None,
            diagnostics: Vec::new(),
        };

        let report = format_report(&snapshot);
        assert!(report.contains("CPU Usage: unavailable"));
        assert!(report.contains("Disk Usage: unavailable"));
        assert!(report.contains("Network: unavailable"));
    }

    #[test]
    fn alert_text_joins_conditions_in_order() {
        let at = Utc.with_ymd_and_hms(2026, 8, 25, 7, 15, 30).unwrap();
        let conditions = vec![
            AlertCondition::new("CPU usage is at 95.0% (threshold: 85%)"),
            AlertCondition::new("Memory usage is at 92.0% (threshold: 90%)"),
        ];

        let text = format_alert(&conditions, at);
        assert_eq!(
            text,
            "August 25, 2026 07:15:30 - CPU usage is at 95.0% (threshold: 85%); \
             Memory usage is at 92.0% (threshold: 90%)"
        );
    }
}
