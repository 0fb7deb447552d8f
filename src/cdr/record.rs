use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
    #[default]
    #[serde(alias = "NO ANSWER")]
    NoAnswer,
    /// Never set by the channel; reported as no answer.
    Null,
    Failed,
    Busy,
    Answered,
    Congestion,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::NoAnswer | Disposition::Null => "NO ANSWER",
            Disposition::Failed => "FAILED",
            Disposition::Busy => "BUSY",
            Disposition::Answered => "ANSWERED",
            Disposition::Congestion => "CONGESTION",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automated message accounting flag.
///
/// Accepts either the flag name or the host's numeric code (0 to 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmaFlags {
    #[default]
    None,
    Omit,
    Billing,
    Documentation,
    /// A raw flag value the host did not map.
    #[serde(untagged)]
    Other(i32),
}

impl AmaFlags {
    const NAMES: &'static [&'static str] = &["NONE", "OMIT", "BILLING", "DOCUMENTATION"];

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => AmaFlags::None,
            1 => AmaFlags::Omit,
            2 => AmaFlags::Billing,
            3 => AmaFlags::Documentation,
            other => AmaFlags::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmaFlags::None => "NONE",
            AmaFlags::Omit => "OMIT",
            AmaFlags::Billing => "BILLING",
            AmaFlags::Documentation => "DOCUMENTATION",
            AmaFlags::Other(_) => "Unknown",
        }
    }
}

impl fmt::Display for AmaFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AmaFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i32),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(AmaFlags::from_code(code)),
            Raw::Name(name) => AmaFlags::NAMES
                .iter()
                .position(|known| known.eq_ignore_ascii_case(name.trim()))
                .map(|code| AmaFlags::from_code(code as i32))
                .ok_or_else(|| <D::Error as de::Error>::unknown_variant(&name, AmaFlags::NAMES)),
        }
    }
}

/// A user defined channel variable attached to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Summary of a completed call as handed over by the call-processing host.
///
/// The publisher only ever reads a record; it is never modified after the
/// host has finalized it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallRecord {
    pub clid: String,
    pub src: String,
    pub dst: String,
    pub dcontext: String,
    pub channel: String,
    pub dstchannel: String,
    pub lastapp: String,
    pub lastdata: String,
    pub start: Option<DateTime<Utc>>,
    pub answer: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Seconds from start to end.
    pub duration: i64,
    /// Seconds from answer to end.
    pub billsec: i64,
    pub disposition: Disposition,
    pub amaflags: AmaFlags,
    pub accountcode: String,
    pub peeraccount: String,
    pub uniqueid: String,
    pub linkedid: String,
    pub tenantid: String,
    pub userfield: String,
    pub sequence: i32,
    /// Variables in the order they were set on the channel.
    pub variables: Vec<Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposition_strings() {
        assert_eq!(Disposition::Answered.as_str(), "ANSWERED");
        assert_eq!(Disposition::NoAnswer.as_str(), "NO ANSWER");
        assert_eq!(Disposition::Null.as_str(), "NO ANSWER");
        assert_eq!(Disposition::Busy.to_string(), "BUSY");
        assert_eq!(Disposition::Failed.to_string(), "FAILED");
        assert_eq!(Disposition::Congestion.to_string(), "CONGESTION");
    }

    #[test]
    fn test_amaflags_strings() {
        assert_eq!(AmaFlags::Documentation.as_str(), "DOCUMENTATION");
        assert_eq!(AmaFlags::Billing.as_str(), "BILLING");
        assert_eq!(AmaFlags::Other(42).as_str(), "Unknown");
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let record: CallRecord = serde_json::from_str(
            r#"{
                "src": "1001",
                "disposition": "ANSWERED",
                "amaflags": "BILLING",
                "start": "2023-11-14T22:13:20Z",
                "variables": [{"name": "foo", "value": "bar"}]
            }"#,
        )
        .unwrap();

        assert_eq!(record.src, "1001");
        assert_eq!(record.dst, "");
        assert_eq!(record.disposition, Disposition::Answered);
        assert_eq!(record.amaflags, AmaFlags::Billing);
        assert!(record.start.is_some());
        assert!(record.answer.is_none());
        assert_eq!(record.variables, vec![Variable::new("foo", "bar")]);
    }

    #[test]
    fn test_deserialize_amaflags_codes() {
        let expected = [
            (0, AmaFlags::None, "NONE"),
            (1, AmaFlags::Omit, "OMIT"),
            (2, AmaFlags::Billing, "BILLING"),
            (3, AmaFlags::Documentation, "DOCUMENTATION"),
        ];

        for (code, flags, name) in expected {
            let record: CallRecord =
                serde_json::from_str(&format!(r#"{{"amaflags": {}}}"#, code)).unwrap();
            assert_eq!(record.amaflags, flags);
            assert_eq!(record.amaflags.as_str(), name);
        }
    }

    #[test]
    fn test_deserialize_amaflags_names() {
        let record: CallRecord = serde_json::from_str(r#"{"amaflags": "documentation"}"#).unwrap();
        assert_eq!(record.amaflags, AmaFlags::Documentation);

        assert!(serde_json::from_str::<CallRecord>(r#"{"amaflags": "BOGUS"}"#).is_err());
    }

    #[test]
    fn test_deserialize_published_disposition() {
        let record: CallRecord = serde_json::from_str(r#"{"disposition": "NO ANSWER"}"#).unwrap();
        assert_eq!(record.disposition, Disposition::NoAnswer);

        let record: CallRecord = serde_json::from_str(r#"{"disposition": "NO_ANSWER"}"#).unwrap();
        assert_eq!(record.disposition, Disposition::NoAnswer);
    }

    #[test]
    fn test_deserialize_raw_amaflags() {
        let record: CallRecord = serde_json::from_str(r#"{"amaflags": 7}"#).unwrap();
        assert_eq!(record.amaflags, AmaFlags::Other(7));
    }
}
