use super::{BrokerClient, OutgoingMessage, Producer};
use crate::config::{Config, ConnectionConfig};
use crate::{Error, Result};
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use rdkafka::ClientConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

pub struct KafkaProducer {
    producer: FutureProducer,
}

impl KafkaProducer {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("compression.type", &config.compression)
            .set("acks", &config.acks)
            .set("linger.ms", config.linger_ms.to_string())
            .set("batch.size", config.batch_size.to_string())
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .create()
            .map_err(Error::Kafka)?;

        Ok(Self { producer })
    }
}

impl Producer for KafkaProducer {
    fn produce(&self, message: &OutgoingMessage) -> Result<()> {
        let headers = message.headers.iter().fold(
            OwnedHeaders::new_with_capacity(message.headers.len()),
            |headers, (name, value)| {
                headers.insert(Header {
                    key: name.as_str(),
                    value: Some(value.as_str()),
                })
            },
        );

        let mut record = FutureRecord::<str, [u8]>::to(&message.topic)
            .payload(message.payload.as_slice())
            .headers(headers);
        if let Some(key) = &message.key {
            record = record.key(key.as_str());
        }

        // The delivery future is dropped: librdkafka keeps the message and
        // reports the outcome through its own logging.
        self.producer
            .send_result(record)
            .map(drop)
            .map_err(|(e, _)| Error::Enqueue(e.to_string()))
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer.flush(timeout).map_err(Error::Kafka)
    }
}

/// Named Kafka connections, each backed by one shared producer.
///
/// Producers are created on first use and reused for every later lookup of
/// the same connection.
pub struct KafkaBroker {
    connections: HashMap<String, ConnectionConfig>,
    producers: Mutex<HashMap<String, Arc<KafkaProducer>>>,
}

impl KafkaBroker {
    pub fn new(connections: HashMap<String, ConnectionConfig>) -> Self {
        Self {
            connections,
            producers: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.kafka.connections.clone())
    }

    pub fn connection_config(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }

    /// Flushes every producer created so far.
    pub fn flush_all(&self, timeout: Duration) -> Result<()> {
        let producers: Vec<(String, Arc<KafkaProducer>)> = self
            .producers
            .lock()
            .map_err(|_| Error::TransportUnavailable("producer registry poisoned".to_string()))?
            .iter()
            .map(|(name, producer)| (name.clone(), Arc::clone(producer)))
            .collect();

        for (name, producer) in producers {
            debug!(connection = %name, "Flushing Kafka producer");
            producer.flush(timeout)?;
        }

        Ok(())
    }
}

impl BrokerClient for KafkaBroker {
    fn producer(&self, connection: &str) -> Result<Arc<dyn Producer>> {
        let config = self.connections.get(connection).ok_or_else(|| {
            Error::TransportUnavailable(format!("Kafka connection '{}' not found", connection))
        })?;

        let mut producers = self
            .producers
            .lock()
            .map_err(|_| Error::TransportUnavailable("producer registry poisoned".to_string()))?;

        if let Some(producer) = producers.get(connection) {
            let producer: Arc<dyn Producer> = producer.clone();
            return Ok(producer);
        }

        let producer = Arc::new(KafkaProducer::new(config)?);
        info!(
            connection = %connection,
            brokers = ?config.brokers,
            "Created Kafka producer"
        );
        producers.insert(connection.to_string(), producer.clone());

        let producer: Arc<dyn Producer> = producer;
        Ok(producer)
    }
}
