use crate::cdr::CallRecord;

/// Header names attached to every message, in order.
pub const HEADER_NAMES: [&str; 5] = ["EntityID", "linkedid", "src", "dst", "disposition"];

/// A fully built message ready to be handed to a producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl OutgoingMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Routing metadata readable without decoding the payload.
pub fn record_headers(record: &CallRecord, entity_id: &str) -> Vec<(String, String)> {
    let values = [
        entity_id,
        record.linkedid.as_str(),
        record.src.as_str(),
        record.dst.as_str(),
        record.disposition.as_str(),
    ];

    HEADER_NAMES
        .iter()
        .zip(values)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdr::{Disposition, Variable};

    #[test]
    fn test_record_headers() {
        let record = CallRecord {
            src: "1001".to_string(),
            dst: "2001".to_string(),
            linkedid: "1700000000.1".to_string(),
            disposition: Disposition::Busy,
            variables: vec![Variable::new("src", "overridden")],
            ..Default::default()
        };

        let headers = record_headers(&record, "00:11:22:33:44:55");
        assert_eq!(
            headers,
            vec![
                ("EntityID".to_string(), "00:11:22:33:44:55".to_string()),
                ("linkedid".to_string(), "1700000000.1".to_string()),
                ("src".to_string(), "1001".to_string()),
                ("dst".to_string(), "2001".to_string()),
                ("disposition".to_string(), "BUSY".to_string()),
            ]
        );
    }

    #[test]
    fn test_header_lookup() {
        let message = OutgoingMessage {
            topic: "t".to_string(),
            key: None,
            payload: Vec::new(),
            headers: record_headers(&CallRecord::default(), "00:00:00:00:00:00"),
        };

        assert_eq!(message.header("disposition"), Some("NO ANSWER"));
        assert_eq!(message.header("src"), Some(""));
        assert_eq!(message.header("missing"), None);
    }
}
