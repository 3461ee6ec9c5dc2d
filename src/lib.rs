pub mod config;
pub mod error;
pub mod monitoring;
pub mod notify;
pub mod scheduler;
pub mod store;

pub use config::{ConfigRecord, NotificationConfig};
pub use store::ConfigStore;

// Re-export monitoring types
pub use monitoring::{
    AlertCondition, AlertDebouncer, AlertState, DiskUsage, MetricsCollector, MetricsSnapshot,
    NetworkCounters, ThresholdEvaluator, Thresholds,
};

// Re-export notification types
pub use notify::{ChannelOutcome, EmailNotifier, NotificationDispatcher, Notifier, SmsNotifier};

// Re-export scheduler types
pub use scheduler::{CycleStatistics, Monitor, MonitorScheduler, SchedulerConfig};

pub use error::{ChannelError, CollectionError, ConfigError, PersistenceError};
