//! Publish pipeline and the entry points called by the call-processing host.
//!
//! Each completed call is published at most once. Any failure drops that
//! record and is returned to the caller; nothing is retried or queued.

use crate::cdr::{key_value, CallRecord, CdrSerializer, HostIdentity};
use crate::config::CdrConfig;
use crate::kafka::{record_headers, BrokerClient, OutgoingMessage, ProducerCache, ProducerHandle};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::{Error, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

pub struct CdrPublisher {
    broker: Arc<dyn BrokerClient>,
    snapshots: SnapshotStore,
    cache: ProducerCache,
    serializer: CdrSerializer,
    reload_lock: Mutex<()>,
}

impl CdrPublisher {
    /// Validates `config`, installs it and primes the producer cache.
    ///
    /// An invalid configuration fails the load. A producer that cannot be
    /// acquired yet does not: publishes will look it up on demand.
    pub fn load(
        broker: Arc<dyn BrokerClient>,
        identity: HostIdentity,
        config: &CdrConfig,
    ) -> Result<Self> {
        let snapshot = Snapshot::from_config(config)?;

        let publisher = Self {
            broker,
            snapshots: SnapshotStore::new(),
            cache: ProducerCache::new(),
            serializer: CdrSerializer::new(identity),
            reload_lock: Mutex::new(()),
        };

        info!(
            connection = %snapshot.connection(),
            topic = %snapshot.topic(),
            key = ?snapshot.key_field(),
            entity_id = %publisher.serializer.entity_id(),
            "CDR Kafka logging enabled"
        );
        publisher.install(snapshot);

        Ok(publisher)
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.current()
    }

    pub fn cache(&self) -> &ProducerCache {
        &self.cache
    }

    pub fn serializer(&self) -> &CdrSerializer {
        &self.serializer
    }

    /// Publishes one finalized call record.
    pub fn on_call_completed(&self, record: &CallRecord) -> Result<()> {
        let snapshot = self.snapshots.current().ok_or(Error::NotLoaded)?;

        let handle = self.producer_for(&snapshot)?;

        let payload = match self.serializer.serialize(record, &snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                error!(linkedid = %record.linkedid, error = %e, "Failed to build string from JSON");
                return Err(e);
            }
        };

        let message = OutgoingMessage {
            topic: snapshot.topic().to_string(),
            key: key_value(record, snapshot.key_field()).map(str::to_string),
            payload,
            headers: record_headers(record, self.serializer.entity_id()),
        };

        let result = handle.produce(&message);
        drop(handle);

        match result {
            Ok(()) => {
                debug!(
                    topic = %message.topic,
                    key = ?message.key,
                    bytes = message.payload.len(),
                    "CDR enqueued"
                );
                Ok(())
            }
            Err(e) => {
                error!(topic = %message.topic, error = %e, "Error publishing CDR to Kafka");
                Err(match e {
                    Error::Enqueue(_) => e,
                    other => Error::Enqueue(other.to_string()),
                })
            }
        }
    }

    /// Replaces the active configuration.
    ///
    /// An invalid configuration is refused and the previous one stays
    /// active. Publishes already running keep the snapshot they started
    /// with.
    pub fn on_reload(&self, config: &CdrConfig) -> Result<()> {
        let snapshot = match Snapshot::from_config(config) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Reload refused, keeping previous configuration");
                return Err(e);
            }
        };

        info!(
            connection = %snapshot.connection(),
            topic = %snapshot.topic(),
            key = ?snapshot.key_field(),
            "Reloading CDR Kafka configuration"
        );
        self.install(snapshot);

        Ok(())
    }

    /// Releases the cached producer and the active configuration.
    pub fn on_shutdown(&self) {
        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.cache.release();
        self.snapshots.clear();
        info!("CDR Kafka logging disabled");
    }

    fn install(&self, snapshot: Snapshot) {
        let _guard = self.reload_lock.lock().unwrap_or_else(|e| e.into_inner());

        let connection = snapshot.connection().to_string();
        self.snapshots.install(snapshot);

        if let Err(e) = self.cache.refresh(self.broker.as_ref(), &connection) {
            warn!(
                connection = %connection,
                error = %e,
                "No cached Kafka producer, publishes will look it up on demand"
            );
        }
    }

    /// Returns the cached handle when it belongs to the snapshot's
    /// connection, otherwise looks one up without caching it.
    fn producer_for(&self, snapshot: &Snapshot) -> Result<Arc<ProducerHandle>> {
        if let Some(handle) = self.cache.get() {
            if handle.connection() == snapshot.connection() {
                return Ok(handle);
            }
            debug!(
                cached = %handle.connection(),
                wanted = %snapshot.connection(),
                "Cached producer belongs to another connection"
            );
        }

        match ProducerHandle::acquire(self.broker.as_ref(), snapshot.connection()) {
            Ok(handle) => Ok(Arc::new(handle)),
            Err(e) => {
                error!(connection = %snapshot.connection(), error = %e, "Failed to get a Kafka producer");
                Err(match e {
                    Error::TransportUnavailable(_) => e,
                    other => Error::TransportUnavailable(other.to_string()),
                })
            }
        }
    }
}
