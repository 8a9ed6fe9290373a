//! Decoder implementations
//!
//! Two boundaries are decoded here: the upstream page body, and the
//! client-side concatenation of every chunk a stream session wrote.

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use crate::types::{JsonObject, Record};
use serde_json::Value;

/// Default list field of a FHIR search bundle
pub const DEFAULT_RECORDS_FIELD: &str = "entry";

// ============================================================================
// Entry Decoder
// ============================================================================

/// Extracts the record list of a page from a JSON object body
///
/// The field may be a dotted path (`data.items`). A missing or `null` field
/// yields `None`.
#[derive(Debug, Clone)]
pub struct EntryDecoder {
    records_field: String,
}

impl Default for EntryDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDS_FIELD)
    }
}

impl EntryDecoder {
    /// Create a decoder reading the given list field
    pub fn new(records_field: impl Into<String>) -> Self {
        Self {
            records_field: records_field.into(),
        }
    }

    /// Name of the list field this decoder reads
    pub fn records_field(&self) -> &str {
        &self.records_field
    }
}

impl RecordDecoder for EntryDecoder {
    fn decode(&self, body: &str) -> Result<Option<Vec<Record>>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;

        let body = match &value {
            Value::Object(body) => body,
            other => {
                return Err(Error::decode(format!(
                    "Expected a JSON object page body, found {}",
                    kind_of(other)
                )))
            }
        };

        match extract_field(body, &self.records_field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(records)) => Ok(Some(records.clone())),
            Some(other) => Err(Error::decode(format!(
                "Field '{}' should be a list, found {}",
                self.records_field,
                kind_of(other)
            ))),
        }
    }
}

/// Follow a dotted path through nested objects
fn extract_field<'a>(body: &'a JsonObject, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut parts = path.split('.');
    let first = body.get(parts.next()?)?;
    parts.try_fold(first, |current, part| current.get(part))
}

// ============================================================================
// Concatenated Arrays
// ============================================================================

/// Parse a reassembled payload into one ordered record list
///
/// The payload is one or more JSON arrays laid end to end with optional
/// whitespace between them. Arrays are flattened in order. An empty payload,
/// a value that is not an array, or trailing garbage is a decode error.
pub fn decode_concatenated(bytes: &[u8]) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut arrays = 0usize;

    for value in serde_json::Deserializer::from_slice(bytes).into_iter::<Value>() {
        let value =
            value.map_err(|e| Error::decode(format!("Invalid JSON received as response: {e}")))?;
        match value {
            Value::Array(items) => records.extend(items),
            other => {
                return Err(Error::decode(format!(
                    "Expected a JSON array, found {}",
                    kind_of(&other)
                )))
            }
        }
        arrays += 1;
    }

    if arrays == 0 {
        return Err(Error::decode("Empty response payload"));
    }

    Ok(records)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
