//! Immutable configuration snapshots and the shared slot that holds the
//! active one.
//!
//! A publish copies the current snapshot out once at the start and works
//! only with that copy. A reload builds a complete new [`Snapshot`] and
//! swaps it in, so a reader sees either the old or the new settings, never
//! a mix.

use crate::cdr::KeyField;
use crate::config::CdrConfig;
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    connection: String,
    topic: String,
    key: Option<String>,
    log_unique_id: bool,
    log_user_field: bool,
}

impl Snapshot {
    /// Validates the publisher section of the configuration.
    ///
    /// The connection name is required. An unrecognised key field is
    /// accepted and produces messages without a key.
    pub fn from_config(config: &CdrConfig) -> Result<Self> {
        let connection = config.connection.trim();
        if connection.is_empty() {
            return Err(Error::Config("no Kafka connection configured".to_string()));
        }

        let topic = config.topic.trim();
        if topic.is_empty() {
            return Err(Error::Config("topic must not be empty".to_string()));
        }

        let key = Some(config.key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        if let Some(key) = &key {
            if key.parse::<KeyField>().is_err() {
                warn!(key = %key, "Unknown key field, messages will be sent without a key");
            }
        }

        Ok(Self {
            connection: connection.to_string(),
            topic: topic.to_string(),
            key,
            log_unique_id: config.loguniqueid,
            log_user_field: config.loguserfield,
        })
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key_field(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn log_unique_id(&self) -> bool {
        self.log_unique_id
    }

    pub fn log_user_field(&self) -> bool {
        self.log_user_field
    }
}

/// Holds the active snapshot. Readers never block writers.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Installs `snapshot` and returns the one it replaced.
    pub fn install(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        self.current.swap(Some(Arc::new(snapshot)))
    }

    pub fn clear(&self) -> Option<Arc<Snapshot>> {
        self.current.swap(None)
    }
}
