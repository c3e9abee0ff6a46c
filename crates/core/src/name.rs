//! Collection name and document id validation
//!
//! Collection names become table identifiers. Parameter binding cannot
//! protect identifiers, so this module is the only thing standing between
//! caller input and the DDL/DML text the engine builds.
//!
//! ## Validation
//!
//! Collection names must:
//! - Be 1-64 characters
//! - Contain only `[A-Za-z0-9_-]`
//! - Not start with `sqlite_` in any case (reserved by the engine)
//!
//! The engine compares table identifiers case-insensitively, so a name is
//! normalized to lower case: `Cases` and `cases` are the same collection.
//!
//! Document ids must:
//! - Be non-empty and at most 512 bytes
//! - Contain no control characters
//!
//! Ids are always bound as parameters, so these rules only keep stored
//! keys printable.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a collection name
pub const MAX_COLLECTION_NAME_LENGTH: usize = 64;

/// Prefix the engine reserves for its own tables
pub const RESERVED_PREFIX: &str = "sqlite_";

/// Maximum length of a document id in bytes
pub const MAX_DOCUMENT_ID_LENGTH: usize = 512;

/// A collection name that passed validation, in lower case
///
/// Holding a `CollectionName` is proof that the name is safe to splice
/// into SQL as a quoted identifier.
///
/// Valid names:
/// - "cases"
/// - "court-hearings"
/// - "audit_log_2024"
///
/// Invalid names:
/// - "" (empty)
/// - "cases; DROP TABLE x"
/// - "o'brien"
/// - "has spaces"
/// - "sqlite_cases"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Create a new CollectionName, validating and lower-casing the input
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCollectionName` if the name is invalid.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match check_collection_name(&name) {
            Ok(()) => Ok(CollectionName(name.to_ascii_lowercase())),
            Err(reason) => Err(Error::InvalidCollectionName { name, reason }),
        }
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier
    ///
    /// Validation guarantees no quote characters, so no escaping is needed.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Consume and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        CollectionName::new(value)
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        CollectionName::new(value)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

fn check_collection_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("collection name cannot be empty".to_string());
    }

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(format!(
            "collection name too long: {} chars (max {})",
            name.len(),
            MAX_COLLECTION_NAME_LENGTH
        ));
    }

    for (pos, ch) in name.chars().enumerate() {
        if !is_valid_char(ch) {
            return Err(format!(
                "invalid character {:?} at position {} (only alphanumeric, dash, underscore allowed)",
                ch, pos
            ));
        }
    }

    if name.len() >= RESERVED_PREFIX.len()
        && name[..RESERVED_PREFIX.len()].eq_ignore_ascii_case(RESERVED_PREFIX)
    {
        return Err(format!(
            "collection name cannot start with '{}' (reserved by the engine)",
            RESERVED_PREFIX
        ));
    }

    Ok(())
}

#[inline]
fn is_valid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Check whether `name` is an acceptable collection name
pub fn validate_collection_name(name: &str) -> bool {
    check_collection_name(name).is_ok()
}

/// Validate `name` and return it as a lower-cased [`CollectionName`]
///
/// # Errors
///
/// Returns `Error::InvalidCollectionName` if the name does not match
/// `^[A-Za-z0-9_-]+$`, exceeds 64 characters, or starts with `sqlite_`.
pub fn sanitize_collection_name(name: &str) -> Result<CollectionName> {
    CollectionName::new(name)
}

/// Validate a document id
///
/// # Errors
///
/// Returns `Error::InvalidDocumentId` if the id is empty, longer than
/// [`MAX_DOCUMENT_ID_LENGTH`] bytes, or contains control characters.
pub fn validate_document_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidDocumentId(
            "document id cannot be empty".to_string(),
        ));
    }
    if id.len() > MAX_DOCUMENT_ID_LENGTH {
        return Err(Error::InvalidDocumentId(format!(
            "document id too long: {} bytes (max {})",
            id.len(),
            MAX_DOCUMENT_ID_LENGTH
        )));
    }
    if let Some(pos) = id.chars().position(char::is_control) {
        return Err(Error::InvalidDocumentId(format!(
            "control character at position {}",
            pos
        )));
    }
    Ok(())
}
