//! Collection: CRUD operations over one provisioned table
//!
//! A `Collection` is obtained from [`Store::collection`], which has already
//! validated the name and provisioned the table. It borrows the store and
//! holds no other state.
//!
//! ## Failure handling
//!
//! - Input errors (bad id, bad condition) are always returned as `Err`.
//! - `insert` reports engine errors as `Ok(false)`.
//! - `upsert`, `update` and `delete_many` report engine errors, and a
//!   missing document for `update`, as a failed [`WriteResult`].
//! - Reads and `delete` return engine errors and `NotFound` as `Err`.
//!
//! Every swallowed failure is logged at warn.

use crate::predicate::{build_order, build_where};
use crate::row::{now_text, RawRow, SELECT_COLUMNS};
use crate::store::Store;
use docket_core::{
    encode_document, generate_id, validate_document_id, CollectionName, Condition, Document,
    Error, QueryOptions, Record, Result, Value, WriteResult,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, warn};

/// Convert a row count to a SQL integer
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Handle to one collection
#[derive(Debug, Clone)]
pub struct Collection<'s> {
    store: &'s Store,
    name: CollectionName,
}

impl<'s> Collection<'s> {
    pub(crate) fn new(store: &'s Store, name: CollectionName) -> Self {
        Collection { store, name }
    }

    /// The collection's validated name
    pub fn name(&self) -> &CollectionName {
        &self.name
    }

    /// `INSERT ... ON CONFLICT DO UPDATE` for this table
    ///
    /// `created_at` is written only by the INSERT arm; the UPDATE arm
    /// replaces the payload and moves `updated_at` forward, never back.
    pub(crate) fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) \
             ON CONFLICT(id) DO UPDATE SET \
             data = excluded.data, \
             updated_at = MAX(updated_at, excluded.updated_at)",
            self.name.quoted()
        )
    }

    fn write_row(&self, conn: &Connection, id: &str, payload: &str) -> rusqlite::Result<usize> {
        conn.execute(&self.upsert_sql(), params![id, payload, now_text()])
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a document, generating an id when it has none
    ///
    /// Best-effort: an engine failure is logged and reported as `Ok(false)`.
    /// Writing an id that already exists replaces that document.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDocumentId` if the supplied id is invalid.
    pub fn insert(&self, doc: Document) -> Result<bool> {
        let id = match doc.id() {
            Some(id) => {
                validate_document_id(id)?;
                id.to_string()
            }
            None => generate_id(),
        };
        let payload = encode_document(&doc);

        let written = self
            .store
            .with_table(&self.name, |conn| self.write_row(conn, &id, &payload));
        match written {
            Ok(_) => {
                debug!(target: "docket::store", collection = %self.name, id = %id, "Inserted");
                Ok(true)
            }
            Err(e) => {
                warn!(
                    target: "docket::store",
                    collection = %self.name,
                    id = %id,
                    error = %e,
                    "Insert failed"
                );
                Ok(false)
            }
        }
    }

    /// Insert or fully replace the document `id`
    ///
    /// Any id carried by `doc` itself is ignored in favour of `id`.
    /// `created_at` is preserved when replacing.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDocumentId` if `id` is invalid. Engine
    /// failures come back as a failed `WriteResult`.
    pub fn upsert(&self, doc: Document, id: &str) -> Result<WriteResult> {
        validate_document_id(id)?;
        let payload = encode_document(&doc);
        Ok(self.store_payload(id, &payload, "Upsert"))
    }

    fn store_payload(&self, id: &str, payload: &str, op: &'static str) -> WriteResult {
        let written = self
            .store
            .with_table(&self.name, |conn| self.write_row(conn, id, payload));
        match written {
            Ok(affected) => {
                debug!(target: "docket::store", collection = %self.name, id = %id, op, "Written");
                WriteResult::ok(affected)
            }
            Err(e) => {
                warn!(
                    target: "docket::store",
                    collection = %self.name,
                    id = %id,
                    op,
                    error = %e,
                    "Write failed"
                );
                WriteResult::failed(e.to_string())
            }
        }
    }

    /// Shallow-merge `patch` onto the document `id` and write it back
    ///
    /// Top-level fields in `patch` replace existing ones; a field set to
    /// [`Value::Absent`] is removed. The read and the write are separate
    /// statements, so concurrent updates to one id are last-writer-wins.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDocumentId` if `id` is invalid. A missing
    /// document or an engine failure comes back as a failed `WriteResult`.
    pub fn update(&self, id: &str, patch: Document) -> Result<WriteResult> {
        validate_document_id(id)?;

        let existing = match self.find(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                let err = Error::not_found(self.name.as_str(), id);
                warn!(
                    target: "docket::store",
                    collection = %self.name,
                    id = %id,
                    "Update of missing document"
                );
                return Ok(WriteResult::failed(err.to_string()));
            }
            Err(e) => {
                warn!(
                    target: "docket::store",
                    collection = %self.name,
                    id = %id,
                    error = %e,
                    "Update read failed"
                );
                return Ok(WriteResult::failed(e.to_string()));
            }
        };

        let mut merged = existing.into_document();
        let (_, fields) = patch.into_parts();
        merged.merge(fields);

        let payload = encode_document(&merged);
        Ok(self.store_payload(id, &payload, "Update"))
    }

    /// Delete the document `id`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no such document exists,
    /// `Error::InvalidDocumentId` for an invalid id, and `Error::Engine` on
    /// engine failure.
    pub fn delete(&self, id: &str) -> Result<()> {
        validate_document_id(id)?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.name.quoted());
        let affected = self
            .store
            .with_table(&self.name, |conn| conn.execute(&sql, [id]))?;
        if affected == 0 {
            return Err(Error::not_found(self.name.as_str(), id));
        }
        debug!(target: "docket::store", collection = %self.name, id = %id, "Deleted");
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn find(&self, id: &str) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            SELECT_COLUMNS,
            self.name.quoted()
        );
        let raw = self.store.with_table(&self.name, |conn| {
            conn.query_row(&sql, [id], RawRow::from_row).optional()
        })?;
        raw.map(|r| r.into_record(self.store.config().nested_decode))
            .transpose()
    }

    /// Read the document `id`
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no such document exists.
    pub fn get_one(&self, id: &str) -> Result<Record> {
        validate_document_id(id)?;
        self.find(id)?
            .ok_or_else(|| Error::not_found(self.name.as_str(), id))
    }

    /// Whether the document `id` exists
    pub fn exists(&self, id: &str) -> Result<bool> {
        validate_document_id(id)?;
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", self.name.quoted());
        self.store
            .with_table(&self.name, |conn| {
                conn.query_row(&sql, [id], |_| Ok(())).optional()
            })
            .map(|found| found.is_some())
    }

    /// Every document, newest first
    pub fn get_all(&self) -> Result<Vec<Record>> {
        self.query(&QueryOptions::new())
    }

    /// The first `n` documents, newest first
    pub fn get_limited(&self, n: usize) -> Result<Vec<Record>> {
        self.query(&QueryOptions::new().limit(n))
    }

    /// Documents whose `field` equals `value`, newest first
    pub fn get_all_where_equals(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>> {
        self.query(&QueryOptions::new().filter(Condition::eq(field, value)))
    }

    /// Filtered, ordered, paginated read
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQueryCondition` for malformed conditions or
    /// ordering, and `Error::Engine` on engine failure.
    pub fn query(&self, options: &QueryOptions) -> Result<Vec<Record>> {
        let clause = build_where(&options.conditions)?;
        let mut params: Vec<SqlValue> = clause.params.clone();
        let order = build_order(options.order_by.as_ref(), &mut params)?;

        let mut sql = format!(
            "SELECT {} FROM {}{}{}",
            SELECT_COLUMNS,
            self.name.quoted(),
            clause.to_sql(),
            order
        );
        match (options.limit, options.offset) {
            (None, None) => {}
            (limit, offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(SqlValue::Integer(limit.map(sql_count).unwrap_or(-1)));
                params.push(SqlValue::Integer(offset.map(sql_count).unwrap_or(0)));
            }
        }

        let rows = self.store.with_table(&self.name, |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), RawRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            rows
        })?;

        let depth = self.store.config().nested_decode;
        rows.into_iter().map(|r| r.into_record(depth)).collect()
    }

    /// Number of documents matching `conditions`
    ///
    /// An empty slice counts the whole collection.
    pub fn count(&self, conditions: &[Condition]) -> Result<u64> {
        let clause = build_where(conditions)?;
        let sql = format!("SELECT COUNT(*) FROM {}{}", self.name.quoted(), clause.to_sql());
        let n: i64 = self.store.with_table(&self.name, |conn| {
            conn.query_row(&sql, params_from_iter(clause.params.iter()), |row| row.get(0))
        })?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    // ========================================================================
    // Bulk
    // ========================================================================

    /// Delete every document matching `conditions`
    ///
    /// Refuses to run without conditions. `affected` on success is the
    /// number of documents removed.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidQueryCondition` if `conditions` is empty or
    /// malformed; nothing is deleted. Engine failures come back as a failed
    /// `WriteResult`.
    pub fn delete_many(&self, conditions: &[Condition]) -> Result<WriteResult> {
        if conditions.is_empty() {
            return Err(Error::invalid_condition(
                "delete_many requires at least one condition",
            ));
        }
        let clause = build_where(conditions)?;
        let sql = format!("DELETE FROM {}{}", self.name.quoted(), clause.to_sql());

        let deleted = self.store.with_table(&self.name, |conn| {
            conn.execute(&sql, params_from_iter(clause.params.iter()))
        });
        match deleted {
            Ok(deleted) => {
                debug!(target: "docket::store", collection = %self.name, deleted, "Bulk delete");
                Ok(WriteResult::ok(deleted))
            }
            Err(e) => {
                warn!(
                    target: "docket::store",
                    collection = %self.name,
                    error = %e,
                    "Bulk delete failed"
                );
                Ok(WriteResult::failed(e.to_string()))
            }
        }
    }

    pub(crate) fn store(&self) -> &'s Store {
        self.store
    }
}
