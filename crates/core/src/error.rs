//! Error types for the document store
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Propagation
//!
//! - `InvalidCollectionName`, `InvalidDocumentId` and `InvalidQueryCondition`
//!   signal unsafe input or programmer error. They are raised before any
//!   statement is built and are never swallowed.
//! - `Engine` wraps any lower-level SQLite failure.
//! - `NotFound` is produced by point operations targeting a missing id.
//! - `PartialBatchFailure` carries per-item diagnostics from a batch write
//!   whose valid items were still committed.

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// A single rejected entry of a batch write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Position of the entry in the submitted batch
    pub index: usize,
    /// Document id, when the entry carried one
    pub id: Option<String>,
    /// Human-readable reason
    pub message: String,
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "item {} ({}): {}", self.index, id, self.message),
            None => write!(f, "item {}: {}", self.index, self.message),
        }
    }
}

/// Error types for the document store
#[derive(Debug, Error)]
pub enum Error {
    /// Collection name failed validation
    #[error("Invalid collection name '{name}': {reason}")]
    InvalidCollectionName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Document identifier failed validation
    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    /// Malformed filter condition or query option
    #[error("Invalid query condition: {0}")]
    InvalidQueryCondition(String),

    /// Point operation targeted a nonexistent document
    #[error("Document '{id}' not found in collection '{collection}'")]
    NotFound {
        /// Collection searched
        collection: String,
        /// Missing id
        id: String,
    },

    /// Storage engine error
    #[error("Engine error: {0}")]
    Engine(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Batch write committed some items but rejected others
    #[error("Batch write rejected {} item(s); {} written", .failures.len(), .written.len())]
    PartialBatchFailure {
        /// Ids that were committed
        written: Vec<String>,
        /// Rejected entries
        failures: Vec<ItemFailure>,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a NotFound error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create an InvalidQueryCondition error
    pub fn invalid_condition(msg: impl Into<String>) -> Self {
        Error::InvalidQueryCondition(msg.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error reflects unsafe input rather than a runtime failure
    ///
    /// These errors must propagate to the caller unchanged.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidCollectionName { .. }
                | Error::InvalidDocumentId(_)
                | Error::InvalidQueryCondition(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
