//! Payload codec
//!
//! Converts a document's fields to the single JSON text stored in a row's
//! `data` column, and back.
//!
//! ## Encoding
//!
//! - `Absent` fields are omitted.
//! - Dates become RFC 3339 strings.
//! - A nested object or array is encoded element-wise by the same rules and
//!   then serialized to a JSON **string** placed at the field's key. This
//!   recursion embeds strings inside strings for deeper nesting.
//!
//! ## Decoding
//!
//! Every top-level string that is bracket-delimited (`{..}` or `[..]`) and
//! parses as JSON is replaced by the parsed value. Anything else is left
//! as-is.
//!
//! With [`DecodeDepth::Shallow`] (the default) only top-level fields are
//! reconstituted, so one level of nesting round-trips but structures two or
//! more levels deep come back with their inner levels still as strings.
//! [`DecodeDepth::Recursive`] applies the same rule at every depth, which
//! restores full nesting at the cost of also parsing bracket-delimited
//! strings the caller stored deliberately.
//!
//! Only the top level of the payload is visible to path filtering, because
//! nested structures are opaque strings inside it.

use crate::document::{Document, ID_FIELD};
use crate::error::{Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// How far decoding reconstitutes embedded structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeDepth {
    /// Top-level fields only
    #[default]
    Shallow,
    /// Every depth
    Recursive,
}

/// Encode fields into the payload map
///
/// Any `id` key is skipped; ids live in their own column.
pub fn encode(fields: &BTreeMap<String, Value>) -> Map<String, JsonValue> {
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .filter_map(|(key, value)| encode_field(value).map(|json| (key.clone(), json)))
        .collect()
}

/// Encode a document's fields into the payload text stored in `data`
pub fn encode_document(doc: &Document) -> String {
    JsonValue::Object(encode(doc.fields())).to_string()
}

/// Encode a single value the way it would appear in the payload
///
/// Returns `None` for `Absent`.
pub fn encode_value(value: &Value) -> Option<JsonValue> {
    encode_field(value)
}

fn encode_field(value: &Value) -> Option<JsonValue> {
    match value {
        Value::Absent => None,
        Value::Object(map) => {
            let inner: Map<String, JsonValue> = map
                .iter()
                .filter_map(|(k, v)| encode_field(v).map(|json| (k.clone(), json)))
                .collect();
            Some(JsonValue::String(JsonValue::Object(inner).to_string()))
        }
        Value::Array(items) => {
            let inner: Vec<JsonValue> = items
                .iter()
                .map(|v| encode_field(v).unwrap_or(JsonValue::Null))
                .collect();
            Some(JsonValue::String(JsonValue::Array(inner).to_string()))
        }
        scalar => scalar.to_json(),
    }
}

/// Decode payload text into its field map
///
/// # Errors
///
/// Returns `Error::Serialization` if the payload is not a JSON object.
pub fn decode(payload: &str, depth: DecodeDepth) -> Result<Map<String, JsonValue>> {
    let parsed: JsonValue = serde_json::from_str(payload)?;
    let JsonValue::Object(map) = parsed else {
        return Err(Error::Serialization(
            "stored payload is not a JSON object".to_string(),
        ));
    };
    Ok(decode_map(map, depth))
}

/// Decode an already-parsed payload map
pub fn decode_map(map: Map<String, JsonValue>, depth: DecodeDepth) -> Map<String, JsonValue> {
    map.into_iter()
        .map(|(key, value)| (key, decode_field(value, depth)))
        .collect()
}

fn decode_field(value: JsonValue, depth: DecodeDepth) -> JsonValue {
    match value {
        JsonValue::String(s) => match parse_embedded(&s) {
            Some(parsed) if depth == DecodeDepth::Recursive => descend(parsed),
            Some(parsed) => parsed,
            None => JsonValue::String(s),
        },
        other => other,
    }
}

fn descend(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, decode_field(v, DecodeDepth::Recursive)))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(
            items
                .into_iter()
                .map(|v| decode_field(v, DecodeDepth::Recursive))
                .collect(),
        ),
        other => other,
    }
}

fn parse_embedded(s: &str) -> Option<JsonValue> {
    if !is_bracket_delimited(s) {
        return None;
    }
    serde_json::from_str(s).ok()
}

fn is_bracket_delimited(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']')))
}
