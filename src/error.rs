use std::path::PathBuf;
use thiserror::Error;

/// Fatal at startup. The agent refuses to run without a complete,
/// parseable configuration record.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Non-fatal, scoped to a single metric category for a single cycle.
/// The affected category is reported as unavailable and skipped by
/// threshold evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("cpu sampling failed: {0}")]
    Cpu(String),

    #[error("memory sampling failed: {0}")]
    Memory(String),

    #[error("disk usage unavailable: {0}")]
    Disk(String),

    #[error("network counters unavailable: {0}")]
    Network(String),
}

/// Non-fatal, scoped to a single notification channel. Surfaced in the
/// dispatcher's per-channel outcome list rather than raised.
#[derive(Error, Debug, Clone)]
#[error("{channel} channel failed: {cause}")]
pub struct ChannelError {
    pub channel: String,
    pub cause: String,
}

impl ChannelError {
    pub fn new(channel: &str, cause: impl Into<String>) -> Self {
        Self {
            channel: channel.to_string(),
            cause: cause.into(),
        }
    }
}

/// Writing updated alert state failed. The decided dispatch still
/// proceeds; the caller logs loudly because a later cycle may now
/// re-dispatch within the cooldown window.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read config record {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config record {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config record: {0}")]
    Serialize(#[from] serde_json::Error),
}
