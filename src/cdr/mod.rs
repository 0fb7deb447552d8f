pub mod fields;
pub mod identity;
pub mod record;
pub mod serializer;

pub use fields::{key_value, KeyField, UnknownKeyField};
pub use identity::{EntityId, HostIdentity};
pub use record::{AmaFlags, CallRecord, Disposition, Variable};
pub use serializer::CdrSerializer;
