//! Durable config store.
//!
//! The config file doubles as the agent's only persistent state: the
//! alert debouncer writes `last_alert_time` back into it so the cooldown
//! survives restarts. Updates are a read-modify-write of the whole
//! record so fields the agent does not understand are carried through
//! untouched, written to a temp file, synced, and renamed into place.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ConfigRecord;
use crate::error::{ConfigError, PersistenceError};

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the full record. Any failure here is fatal at
    /// startup.
    pub fn load(&self) -> Result<ConfigRecord, ConfigError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist a new `last_alert_time` by rewriting the whole record.
    ///
    /// The record is re-read rather than patched from memory so that
    /// fields edited externally since startup are not clobbered.
    pub fn update_last_alert(&self, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| PersistenceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut record: Value = serde_json::from_str(&raw)?;
        let fields = record.as_object_mut().ok_or_else(|| PersistenceError::Read {
            path: self.path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "config record is not a JSON object",
            ),
        })?;
        fields.insert(
            "last_alert_time".to_string(),
            Value::String(at.to_rfc3339()),
        );

        let serialized = serde_json::to_vec_pretty(&record)?;
        let tmp = self.path.with_extension("json.tmp");
        let write_tmp = |path: &Path| -> std::io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(&serialized)?;
            // Flush to disk before the rename so a crash cannot replace
            // the record with a truncated temp file.
            file.sync_all()
        };
        write_tmp(&tmp).map_err(|source| PersistenceError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), last_alert_time = %at, "alert state persisted");
        Ok(())
    }
}
