use super::{BrokerClient, ProducerHandle};
use crate::Result;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single shared slot holding the producer for the active connection.
///
/// Only [`refresh`](Self::refresh) writes the slot. Readers take their own
/// reference, so a handle replaced mid-publish stays alive until that
/// publish drops it.
#[derive(Debug, Default)]
pub struct ProducerCache {
    slot: ArcSwapOption<ProducerHandle>,
}

impl ProducerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<ProducerHandle>> {
        self.slot.load_full()
    }

    /// Acquires a fresh handle for `connection` and installs it.
    ///
    /// On failure the previous handle, if any, stays in place.
    pub fn refresh(&self, broker: &dyn BrokerClient, connection: &str) -> Result<()> {
        let handle = match ProducerHandle::acquire(broker, connection) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(connection = %connection, error = %e, "Failed to refresh cached producer");
                return Err(e);
            }
        };

        let previous = self.slot.swap(Some(Arc::new(handle)));
        info!(connection = %connection, "Cached Kafka producer refreshed");
        if let Some(previous) = previous {
            debug!(connection = %previous.connection(), "Released previous cached producer");
        }

        Ok(())
    }

    /// Drops the cached handle. Safe to call repeatedly.
    pub fn release(&self) {
        if let Some(previous) = self.slot.swap(None) {
            debug!(connection = %previous.connection(), "Released cached producer");
        }
    }
}
