//! Documents written to, and records read from, a collection
//!
//! A [`Document`] is the write-side shape: an optional id plus a map of
//! [`Value`] fields. A [`Record`] is what reads return: the decoded payload
//! together with the row's id and timestamps.
//!
//! The `id` field is never part of the payload. It lives in the row's
//! primary-key column and is reattached by [`Record::to_json`].

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Name of the distinguished identifier field
pub const ID_FIELD: &str = "id";

/// Generate a fresh document id (UUID v4, simple form)
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A document to be written
///
/// # Example
///
/// ```
/// use docket_core::{Document, Value};
///
/// let doc = Document::with_id("case-1")
///     .with("status", "active")
///     .with("judge", Value::Absent);
/// assert_eq!(doc.id(), Some("case-1"));
/// assert!(doc.get("judge").unwrap().is_absent());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    id: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document without an id
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with the given id
    pub fn with_id(id: impl Into<String>) -> Self {
        Document {
            id: Some(id.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Build a document from a JSON object
    ///
    /// A top-level `id` key, when present, must be a string or an integer
    /// and becomes the document id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if `json` is not an object and
    /// `Error::InvalidDocumentId` if `id` has an unusable type.
    pub fn from_json(json: JsonValue) -> Result<Self> {
        let JsonValue::Object(map) = json else {
            return Err(Error::Serialization(
                "document must be a JSON object".to_string(),
            ));
        };

        let mut doc = Document::new();
        for (key, value) in map {
            if key == ID_FIELD {
                doc.id = match value {
                    JsonValue::String(s) => Some(s),
                    JsonValue::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
                    JsonValue::Null => None,
                    other => {
                        return Err(Error::InvalidDocumentId(format!(
                            "id must be a string, got {}",
                            other
                        )))
                    }
                };
            } else {
                doc.fields.insert(key, Value::from(value));
            }
        }
        Ok(doc)
    }

    /// Document id, if one was supplied
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Replace the document id
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Set a field
    ///
    /// The key `id` is routed to the identifier: string and integer values
    /// set it, `Absent` clears it, anything else is ignored.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if key == ID_FIELD {
            match value {
                Value::String(s) => self.id = Some(s),
                Value::Int(i) => self.id = Some(i.to_string()),
                Value::Absent => self.id = None,
                _ => {}
            }
        } else {
            self.fields.insert(key, value);
        }
        self
    }

    /// Builder form of [`Document::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Remove a field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// All non-id fields
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Number of non-id fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the document carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shallow-merge `patch` over this document
    ///
    /// Top-level keys in `patch` replace existing ones. A patch value of
    /// `Absent` overwrites the field with `Absent`, which removes it on the
    /// next write.
    pub fn merge(&mut self, patch: BTreeMap<String, Value>) {
        for (key, value) in patch {
            self.set(key, value);
        }
    }

    /// Split into id and fields
    pub fn into_parts(self) -> (Option<String>, BTreeMap<String, Value>) {
        (self.id, self.fields)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.set(k, v);
        }
        doc
    }
}

/// A document as stored in a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Document id
    pub id: String,
    /// Decoded payload fields
    pub fields: Map<String, JsonValue>,
    /// When the document was first written
    pub created_at: DateTime<Utc>,
    /// When the document was last written
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Get a decoded field
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Get a string field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(JsonValue::as_str)
    }

    /// Parse a string field holding an RFC 3339 date
    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.get_str(key)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// The flattened `{id, ...fields}` object
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert(ID_FIELD.to_string(), JsonValue::String(self.id.clone()));
        for (k, v) in &self.fields {
            map.insert(k.clone(), v.clone());
        }
        JsonValue::Object(map)
    }

    /// Convert back into a writable document with the same id
    pub fn into_document(self) -> Document {
        Document {
            id: Some(self.id),
            fields: self
                .fields
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        }
    }
}
