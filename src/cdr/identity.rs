use crate::config::HostConfig;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Stable identifier of the originating server, rendered in hardware
/// address form (`00:11:22:33:44:55`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EntityId([u8; 6]);

impl EntityId {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid entity id '{}'", s));

        let mut octets = [0u8; 6];
        let mut parts = s.trim().split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || part.len() > 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }
}

/// Host-level identity attached to every published record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    pub entity_id: EntityId,
    /// Omitted from the payload when `None`.
    pub system_name: Option<String>,
}

impl HostIdentity {
    pub fn new(entity_id: EntityId, system_name: Option<String>) -> Self {
        Self {
            entity_id,
            system_name: system_name.filter(|name| !name.is_empty()),
        }
    }

    pub fn from_config(config: &HostConfig) -> Result<Self> {
        let entity_id = match config.entity_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.parse()?,
            _ => {
                warn!("No entity id configured, using 00:00:00:00:00:00");
                EntityId::default()
            }
        };

        Ok(Self::new(entity_id, config.system_name.clone()))
    }
}
