use super::OutgoingMessage;
use crate::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A connection able to accept messages for publication.
///
/// `produce` only enqueues: `Ok` means the client accepted the message
/// into its send buffer, not that the broker received it.
pub trait Producer: Send + Sync {
    fn produce(&self, message: &OutgoingMessage) -> Result<()>;

    /// Waits up to `timeout` for buffered messages to be delivered.
    fn flush(&self, timeout: Duration) -> Result<()>;
}

/// Looks up producers by connection name.
///
/// Implementations may lock or check connection state during a lookup,
/// which is why the publisher keeps the result in a [`ProducerCache`].
///
/// [`ProducerCache`]: super::ProducerCache
pub trait BrokerClient: Send + Sync {
    fn producer(&self, connection: &str) -> Result<Arc<dyn Producer>>;
}

/// A producer bound to the connection name it was acquired for.
///
/// Handles are shared through `Arc`; the underlying producer is released
/// when the last holder drops its reference.
#[derive(Clone)]
pub struct ProducerHandle {
    connection: String,
    producer: Arc<dyn Producer>,
}

impl ProducerHandle {
    pub fn new(connection: impl Into<String>, producer: Arc<dyn Producer>) -> Self {
        Self {
            connection: connection.into(),
            producer,
        }
    }

    pub fn acquire(broker: &dyn BrokerClient, connection: &str) -> Result<Self> {
        let producer = broker.producer(connection)?;
        Ok(Self::new(connection, producer))
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn produce(&self, message: &OutgoingMessage) -> Result<()> {
        self.producer.produce(message)
    }

    pub fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer.flush(timeout)
    }
}

impl fmt::Debug for ProducerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerHandle")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
