//! Normalization of location service payloads into [`ClientRecord`]s.
//!
//! Each schema provides an [`EntryParser`]. A bad entry is dropped on its own;
//! the rest of the payload is still used.

mod schema_a;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::MalformedEntry;
use crate::record::ClientRecord;
use crate::schema::SchemaVersion;

pub use schema_a::SchemaA;

/// Maps one raw service entry to a record.
pub trait EntryParser {
    fn parse_entry(&self, entry: &Value, observed_at: DateTime<Utc>) -> Result<ClientRecord, MalformedEntry>;
}

/// Parser for a schema, if one exists.
///
/// Schema B has none: its payloads have never been validated against a live
/// service.
pub fn parser_for(schema: SchemaVersion) -> Option<&'static dyn EntryParser> {
    match schema {
        SchemaVersion::A => Some(&SchemaA),
        SchemaVersion::B => None,
    }
}

pub struct Normalizer {
    schema: SchemaVersion,
}

impl Normalizer {
    pub fn new(schema: SchemaVersion) -> Self {
        Self { schema }
    }

    /// Normalize a multi-client payload. Never synthesizes placeholders.
    pub fn normalize_batch(&self, raw: &Value) -> Vec<ClientRecord> {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalize the answer to a by-identifier query.
    ///
    /// Under a supported schema the result always holds at least one record:
    /// when nothing usable came back, a placeholder for `requested_id` is
    /// returned instead.
    pub fn normalize_lookup(&self, raw: &Value, requested_id: &str) -> Vec<ClientRecord> {
        let observed_at = Utc::now();
        if parser_for(self.schema).is_none() {
            warn!("Schema {} client payloads are not supported", self.schema);
            return Vec::new();
        }

        let records = self.normalize_at(raw, observed_at);
        if records.is_empty() {
            debug!("No client data for {}, using placeholder", requested_id);
            return vec![ClientRecord::placeholder(requested_id, observed_at)];
        }
        records
    }

    fn normalize_at(&self, raw: &Value, observed_at: DateTime<Utc>) -> Vec<ClientRecord> {
        let Some(parser) = parser_for(self.schema) else {
            warn!("Schema {} client payloads are not supported", self.schema);
            return Vec::new();
        };

        let entries = match raw.as_array() {
            Some(entries) => entries,
            None => {
                warn!("Expected a list of clients, got {}", json_kind(raw));
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match parser.parse_entry(entry, observed_at) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Dropping client entry {}: {}", index, e),
            }
        }

        debug!("Parsed {} of {} client entries", records.len(), entries.len());
        records
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
