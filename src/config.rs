use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Resolved file configuration.
///
/// `kafka` describes the broker connections available to the process,
/// `cdr` selects one of them and controls what is published, `host` carries
/// the identity stamped on every record.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub kafka: KafkaConfig,
    pub cdr: CdrConfig,
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KafkaConfig {
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    pub brokers: Vec<String>,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CdrConfig {
    /// Name of the entry in `kafka.connections` to publish through.
    #[serde(default)]
    pub connection: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Record field used as the message key. Empty means no key.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub loguniqueid: bool,
    #[serde(default)]
    pub loguserfield: bool,
    /// Create the topic at start-up if it does not exist.
    #[serde(default)]
    pub ensure_topic: bool,
    #[serde(default = "default_topic_partitions")]
    pub topic_partitions: i32,
    #[serde(default = "default_topic_replication_factor")]
    pub topic_replication_factor: i32,
}

impl Default for CdrConfig {
    fn default() -> Self {
        Self {
            connection: String::new(),
            topic: default_topic(),
            key: String::new(),
            loguniqueid: false,
            loguserfield: false,
            ensure_topic: false,
            topic_partitions: default_topic_partitions(),
            topic_replication_factor: default_topic_replication_factor(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostConfig {
    /// Colon separated hex octets, e.g. `00:11:22:33:44:55`.
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CDR_KAFKA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.kafka.connections.get(name)
    }
}

fn default_client_id() -> String {
    "cdr-kafka".to_string()
}

fn default_compression() -> String {
    "snappy".to_string()
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_linger_ms() -> u32 {
    100
}

fn default_batch_size() -> usize {
    16384
}

fn default_message_timeout_ms() -> u32 {
    300_000
}

fn default_topic() -> String {
    "asterisk_cdr".to_string()
}

fn default_topic_partitions() -> i32 {
    1
}

fn default_topic_replication_factor() -> i32 {
    1
}
