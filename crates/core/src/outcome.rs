//! Structured write results
//!
//! Operations with a "report, don't throw" contract (`upsert`, `update`,
//! `delete_many`, `upsert_many`) return these so callers can surface the
//! message to an end user directly.

use crate::error::{Error, ItemFailure, Result};

/// Outcome of a single write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Whether the write took effect
    pub success: bool,
    /// Human-readable failure reason
    pub error: Option<String>,
    /// Rows affected
    pub affected: usize,
}

impl WriteResult {
    /// A successful write touching `affected` rows
    pub fn ok(affected: usize) -> Self {
        WriteResult {
            success: true,
            error: None,
            affected,
        }
    }

    /// A failed write
    pub fn failed(message: impl Into<String>) -> Self {
        WriteResult {
            success: false,
            error: Some(message.into()),
            affected: 0,
        }
    }

    /// True if the write took effect
    pub fn is_ok(&self) -> bool {
        self.success
    }
}

/// Outcome of a batch upsert
///
/// Valid items are committed together; `failures` lists entries rejected
/// before the commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Ids committed, in submission order
    pub written: Vec<String>,
    /// Rejected entries
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    /// True if every entry was written
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of committed entries
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Convert into a `Result`, failing if any item was rejected
    ///
    /// # Errors
    ///
    /// Returns `Error::PartialBatchFailure` carrying both lists when
    /// `failures` is non-empty.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.failures.is_empty() {
            Ok(self.written)
        } else {
            Err(Error::PartialBatchFailure {
                written: self.written,
                failures: self.failures,
            })
        }
    }
}
