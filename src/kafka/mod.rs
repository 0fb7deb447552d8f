pub mod broker;
pub mod cache;
pub mod message;
pub mod producer;
pub mod topic_manager;


pub use broker::{BrokerClient, Producer, ProducerHandle};
pub use cache::ProducerCache;
pub use message::{record_headers, OutgoingMessage, HEADER_NAMES};
pub use producer::{KafkaBroker, KafkaProducer};
pub use topic_manager::TopicManager;
