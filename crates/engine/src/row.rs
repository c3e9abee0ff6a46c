//! Row timestamps and row-to-record decoding

use chrono::{DateTime, SecondsFormat, Utc};
use docket_core::{decode, DecodeDepth, Error, Record, Result};

/// Column list selected by every read, in [`RawRow`] order
pub const SELECT_COLUMNS: &str = "id, data, created_at, updated_at";

/// Current time as stored in `created_at`/`updated_at`
///
/// Fixed-width RFC 3339 with microseconds, so text order is time order.
pub fn now_text() -> String {
    timestamp_text(&Utc::now())
}

/// Render a timestamp in the stored format
pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(format!("bad stored timestamp '{}': {}", raw, e)))
}

/// A row as read from a collection table, before decoding
#[derive(Debug, Clone)]
pub struct RawRow {
    pub id: String,
    pub data: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RawRow {
    /// Read the four selected columns
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRow {
            id: row.get(0)?,
            data: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }

    /// Decode into a record
    pub fn into_record(self, depth: DecodeDepth) -> Result<Record> {
        Ok(Record {
            fields: decode(&self.data, depth)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
        })
    }
}
