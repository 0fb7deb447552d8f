#![allow(dead_code)]

use cdr_kafka::cdr::{AmaFlags, CallRecord, Disposition, EntityId, HostIdentity};
use cdr_kafka::config::{CdrConfig, ConnectionConfig};
use cdr_kafka::kafka::{BrokerClient, OutgoingMessage, Producer};
use cdr_kafka::{Error, Result};
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Producer that records every message it accepts.
pub struct RecordingProducer {
    pub connection: String,
    pub messages: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingProducer {
    pub fn new(connection: &str) -> Self {
        Self {
            connection: connection.to_string(),
            messages: Mutex::new(Vec::new()),
        }
    }
}

impl Producer for RecordingProducer {
    fn produce(&self, message: &OutgoingMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

/// In-memory broker with one recording producer per known connection.
pub struct MockBroker {
    producers: Vec<Arc<RecordingProducer>>,
    unavailable: Mutex<HashSet<String>>,
    pub lookups: AtomicUsize,
}

impl MockBroker {
    pub fn new(connections: &[&str]) -> Self {
        Self {
            producers: connections
                .iter()
                .map(|name| Arc::new(RecordingProducer::new(name)))
                .collect(),
            unavailable: Mutex::new(HashSet::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn set_unavailable(&self, connection: &str, unavailable: bool) {
        let mut set = self.unavailable.lock().unwrap();
        if unavailable {
            set.insert(connection.to_string());
        } else {
            set.remove(connection);
        }
    }

    pub fn messages(&self, connection: &str) -> Vec<OutgoingMessage> {
        self.producers
            .iter()
            .find(|p| p.connection == connection)
            .map(|p| p.messages.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

impl BrokerClient for MockBroker {
    fn producer(&self, connection: &str) -> Result<Arc<dyn Producer>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.lock().unwrap().contains(connection) {
            return Err(Error::TransportUnavailable(connection.to_string()));
        }

        let producer = self
            .producers
            .iter()
            .find(|p| p.connection == connection)
            .cloned()
            .ok_or_else(|| Error::TransportUnavailable(connection.to_string()))?;

        let producer: Arc<dyn Producer> = producer;
        Ok(producer)
    }
}

pub fn test_identity() -> HostIdentity {
    HostIdentity::new(
        EntityId::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
        Some("pbx-01".to_string()),
    )
}

pub fn test_cdr_config(connection: &str, key: &str) -> CdrConfig {
    CdrConfig {
        connection: connection.to_string(),
        key: key.to_string(),
        ..Default::default()
    }
}

/// Record with deterministic values in every field.
pub fn test_record() -> CallRecord {
    CallRecord {
        clid: "\"Test User\" <1001>".to_string(),
        src: "1001".to_string(),
        dst: "2001".to_string(),
        dcontext: "from-internal".to_string(),
        channel: "PJSIP/1001-00000001".to_string(),
        dstchannel: "PJSIP/2001-00000002".to_string(),
        lastapp: "Dial".to_string(),
        lastdata: "PJSIP/2001,30".to_string(),
        start: Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()),
        answer: Some(Utc.timestamp_opt(1_700_000_005, 0).unwrap()),
        end: Some(Utc.timestamp_opt(1_700_000_120, 0).unwrap()),
        duration: 120,
        billsec: 115,
        disposition: Disposition::Answered,
        amaflags: AmaFlags::Documentation,
        accountcode: "acct-100".to_string(),
        peeraccount: "acct-200".to_string(),
        uniqueid: "1700000000.1".to_string(),
        linkedid: "1700000000.1".to_string(),
        tenantid: "tenant-01".to_string(),
        userfield: "custom-data".to_string(),
        sequence: 1,
        variables: Vec::new(),
    }
}

/// Kafka connection taken from the environment for tests against a live broker.
pub fn test_connection_config() -> ConnectionConfig {
    ConnectionConfig {
        brokers: env::var("TEST_KAFKA_BROKERS")
            .unwrap_or_else(|_| "localhost:9092".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        client_id: format!("cdr-kafka-test-{}", std::process::id()),
        compression: "none".to_string(), // No compression for tests
        acks: "all".to_string(),
        linger_ms: 0, // Immediate sending for tests
        batch_size: 1,
        message_timeout_ms: 10_000,
    }
}
