use super::{CallRecord, HostIdentity};
use crate::snapshot::Snapshot;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Turns call records into the JSON document published to the topic.
///
/// Key order on the wire: fixed fields, host identity, record variables,
/// then the optional fields enabled in the snapshot. A variable with the
/// same name as a fixed field replaces it; an enabled optional field
/// replaces a variable of the same name.
#[derive(Debug, Clone)]
pub struct CdrSerializer {
    identity: HostIdentity,
    entity_id: String,
}

impl CdrSerializer {
    pub fn new(identity: HostIdentity) -> Self {
        let entity_id = identity.entity_id.to_string();
        Self {
            identity,
            entity_id,
        }
    }

    pub fn identity(&self) -> &HostIdentity {
        &self.identity
    }

    /// The entity id as it appears in payloads and headers.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn to_json(&self, record: &CallRecord, snapshot: &Snapshot) -> Map<String, Value> {
        let mut json = Map::with_capacity(24 + record.variables.len());

        json.insert("clid".into(), record.clid.as_str().into());
        json.insert("src".into(), record.src.as_str().into());
        json.insert("dst".into(), record.dst.as_str().into());
        json.insert("dcontext".into(), record.dcontext.as_str().into());

        json.insert("channel".into(), record.channel.as_str().into());
        json.insert("dstchannel".into(), record.dstchannel.as_str().into());
        json.insert("lastapp".into(), record.lastapp.as_str().into());
        json.insert("lastdata".into(), record.lastdata.as_str().into());

        json.insert("start".into(), timestamp(record.start.as_ref()));
        json.insert("answer".into(), timestamp(record.answer.as_ref()));
        json.insert("end".into(), timestamp(record.end.as_ref()));
        json.insert("durationsec".into(), record.duration.into());

        json.insert("billsec".into(), record.billsec.into());
        json.insert("disposition".into(), record.disposition.as_str().into());
        json.insert("accountcode".into(), record.accountcode.as_str().into());
        json.insert("amaflags".into(), record.amaflags.as_str().into());

        json.insert("peeraccount".into(), record.peeraccount.as_str().into());
        json.insert("linkedid".into(), record.linkedid.as_str().into());
        json.insert("sequence".into(), record.sequence.into());

        json.insert("EntityID".into(), self.entity_id.as_str().into());
        if let Some(name) = &self.identity.system_name {
            json.insert("SystemName".into(), name.as_str().into());
        }

        for var in &record.variables {
            json.insert(var.name.clone(), var.value.as_str().into());
        }

        if snapshot.log_unique_id() {
            json.insert("uniqueid".into(), record.uniqueid.as_str().into());
        }
        if snapshot.log_user_field() {
            json.insert("userfield".into(), record.userfield.as_str().into());
        }

        json
    }

    /// Renders the record as compact UTF-8 JSON.
    pub fn serialize(&self, record: &CallRecord, snapshot: &Snapshot) -> Result<Vec<u8>> {
        let json = Value::Object(self.to_json(record, snapshot));
        serde_json::to_vec(&json).map_err(|e| Error::Build(e.to_string()))
    }
}

fn timestamp(ts: Option<&DateTime<Utc>>) -> Value {
    match ts {
        Some(ts) if ts.timestamp() != 0 || ts.timestamp_subsec_micros() != 0 => {
            Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
        }
        _ => Value::Null,
    }
}
