use super::CallRecord;
use std::fmt;
use std::str::FromStr;

/// Record fields that may be selected as the message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    LinkedId,
    UniqueId,
    Channel,
    DstChannel,
    AccountCode,
    Src,
    Dst,
    DContext,
    TenantId,
}

impl KeyField {
    pub const ALL: [KeyField; 9] = [
        KeyField::LinkedId,
        KeyField::UniqueId,
        KeyField::Channel,
        KeyField::DstChannel,
        KeyField::AccountCode,
        KeyField::Src,
        KeyField::Dst,
        KeyField::DContext,
        KeyField::TenantId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KeyField::LinkedId => "linkedid",
            KeyField::UniqueId => "uniqueid",
            KeyField::Channel => "channel",
            KeyField::DstChannel => "dstchannel",
            KeyField::AccountCode => "accountcode",
            KeyField::Src => "src",
            KeyField::Dst => "dst",
            KeyField::DContext => "dcontext",
            KeyField::TenantId => "tenantid",
        }
    }

    pub fn value<'a>(&self, record: &'a CallRecord) -> &'a str {
        match self {
            KeyField::LinkedId => &record.linkedid,
            KeyField::UniqueId => &record.uniqueid,
            KeyField::Channel => &record.channel,
            KeyField::DstChannel => &record.dstchannel,
            KeyField::AccountCode => &record.accountcode,
            KeyField::Src => &record.src,
            KeyField::Dst => &record.dst,
            KeyField::DContext => &record.dcontext,
            KeyField::TenantId => &record.tenantid,
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyField(pub String);

impl fmt::Display for UnknownKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key field '{}'", self.0)
    }
}

impl std::error::Error for UnknownKeyField {}

impl FromStr for KeyField {
    type Err = UnknownKeyField;

    /// Case-insensitive, exact match only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKeyField(s.to_string()))
    }
}

/// Looks up the value of the named field for use as a message key.
///
/// Returns `None` when `field_name` is absent, empty or not one of the
/// [`KeyField`] names.
pub fn key_value<'a>(record: &'a CallRecord, field_name: Option<&str>) -> Option<&'a str> {
    let name = field_name.filter(|name| !name.is_empty())?;
    name.parse::<KeyField>()
        .ok()
        .map(|field| field.value(record))
}
