mod common;

use cdr_kafka::kafka::{KafkaBroker, TopicManager};
use cdr_kafka::CdrPublisher;
use common::{test_cdr_config, test_connection_config, test_identity, test_record};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Headers;
use rdkafka::Message;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_publish_to_kafka() {
    tracing_subscriber::fmt()
        .with_env_filter("cdr_kafka=debug,rdkafka=info")
        .try_init()
        .ok();

    let topic = format!("cdr_kafka_test_{}", std::process::id());
    let connection = test_connection_config();

    TopicManager::new(&connection, 1, 1)
        .unwrap()
        .ensure_topic(&topic)
        .await
        .unwrap();

    let mut connections = HashMap::new();
    connections.insert("default".to_string(), connection.clone());
    let broker = Arc::new(KafkaBroker::new(connections));

    let mut config = test_cdr_config("default", "linkedid");
    config.topic = topic.clone();
    let publisher = CdrPublisher::load(broker.clone(), test_identity(), &config).unwrap();

    publisher.on_call_completed(&test_record()).unwrap();
    broker.flush_all(Duration::from_secs(10)).unwrap();

    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", connection.brokers.join(","))
        .set("group.id", format!("{}_group", topic))
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "false")
        .create()
        .unwrap();
    consumer.subscribe(&[topic.as_str()]).unwrap();

    let message = timeout(Duration::from_secs(30), consumer.recv())
        .await
        .expect("timed out waiting for CDR")
        .unwrap();

    assert_eq!(message.key(), Some("1700000000.1".as_bytes()));

    let json: Value = serde_json::from_slice(message.payload().unwrap()).unwrap();
    assert_eq!(json["src"], "1001");
    assert_eq!(json["dst"], "2001");
    assert_eq!(json["EntityID"], "00:11:22:33:44:55");

    let headers = message.headers().unwrap();
    assert_eq!(headers.count(), 5);
    let first = headers.get(0);
    assert_eq!(first.key, "EntityID");
    assert_eq!(first.value, Some("00:11:22:33:44:55".as_bytes()));

    publisher.on_shutdown();
}
