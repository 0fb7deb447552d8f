use crate::config::ConnectionConfig;
use crate::{Error, Result};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Creates the publish topic when it is missing.
pub struct TopicManager {
    admin_client: AdminClient<DefaultClientContext>,
    partitions: i32,
    replication_factor: i32,
}

impl TopicManager {
    pub fn new(connection: &ConnectionConfig, partitions: i32, replication_factor: i32) -> Result<Self> {
        if partitions < 1 || replication_factor < 1 {
            return Err(Error::Config(format!(
                "invalid topic layout: {} partitions, replication factor {}",
                partitions, replication_factor
            )));
        }

        let admin_client: AdminClient<_> = ClientConfig::new()
            .set("bootstrap.servers", connection.brokers.join(","))
            .set("client.id", &connection.client_id)
            .create()
            .map_err(Error::Kafka)?;

        Ok(Self {
            admin_client,
            partitions,
            replication_factor,
        })
    }

    #[instrument(skip(self), fields(topic = %topic_name))]
    pub async fn ensure_topic(&self, topic_name: &str) -> Result<()> {
        let new_topic = NewTopic::new(
            topic_name,
            self.partitions,
            TopicReplication::Fixed(self.replication_factor),
        );

        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(30)));

        let results = self
            .admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(Error::Kafka)?;

        for result in results {
            match result {
                Ok(topic) => {
                    info!("Created topic: {}", topic);
                }
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    debug!("Topic '{}' already exists", topic);
                }
                Err((_topic, error)) => {
                    return Err(Error::Kafka(rdkafka::error::KafkaError::AdminOp(error)));
                }
            }
        }

        Ok(())
    }
}
