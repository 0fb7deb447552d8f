pub mod cdr;
pub mod config;
pub mod error;
pub mod kafka;
pub mod publisher;
pub mod snapshot;

pub use cdr::{CallRecord, HostIdentity};
pub use config::Config;
pub use error::{Error, Result};
pub use publisher::CdrPublisher;
pub use snapshot::Snapshot;
