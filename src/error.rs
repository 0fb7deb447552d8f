//! Error types and result handling for cdr-kafka.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! Failures fall into two groups. Configuration errors are raised at
//! load/reload time and refuse the new configuration. Every other error is
//! local to a single call record: the record is dropped and the failure is
//! reported to the caller, nothing is retried.
//!
//! # Example
//!
//! ```rust
//! use cdr_kafka::{Error, Result};
//!
//! fn acquire() -> Result<()> {
//!     Err(Error::TransportUnavailable("connection 'default' not found".to_string()))
//! }
//!
//! match acquire() {
//!     Ok(()) => println!("Published"),
//!     Err(e) if e.is_per_event() => eprintln!("Record dropped: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for cdr-kafka operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is missing or invalid. Load/reload is refused.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No configuration snapshot has been installed (or it was released on
    /// shutdown).
    #[error("Publisher is not loaded")]
    NotLoaded,

    /// No producer handle could be obtained for the configured connection.
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The record could not be turned into a JSON document.
    #[error("Failed to build message: {0}")]
    Build(String),

    /// The broker client refused to accept the message into its buffer.
    #[error("Enqueue failed: {0}")]
    Enqueue(String),

    /// Kafka client error.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

impl Error {
    /// Returns `true` for failures that only affect a single call record.
    pub fn is_per_event(&self) -> bool {
        matches!(
            self,
            Error::NotLoaded
                | Error::TransportUnavailable(_)
                | Error::Build(_)
                | Error::Enqueue(_)
        )
    }
}

/// A convenient Result type alias for cdr-kafka operations.
///
/// This is equivalent to `std::result::Result<T, cdr_kafka::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
