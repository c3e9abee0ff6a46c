//! Store: the process-wide handle to the SQLite engine
//!
//! A `Store` owns one connection, configured once at open time
//! (journal mode, foreign keys, busy timeout), and is passed by reference
//! to every operation. It is `Send + Sync`; statements are serialized on
//! the connection mutex for the duration of a single call.
//!
//! ## Concurrency
//!
//! The store adds no locking above the engine. Read-modify-write
//! operations (`update`) read and write in separate statements, so two
//! concurrent updates to the same id race and the later commit wins.
//!
//! ## Collections
//!
//! Collections are provisioned lazily on first use. [`Store::collection`]
//! validates and provisions once and returns a [`Collection`] handle; the
//! name-taking methods on `Store` do the same on every call.
//!
//! The store remembers which collections it has provisioned. A table
//! dropped behind its back (by another handle on the same file) is
//! recreated empty by the next operation that finds it missing.

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::provision;
use docket_core::{
    sanitize_collection_name, BatchReport, CollectionName, Condition, Document, Error,
    QueryOptions, Record, Result, Value, WriteResult,
};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Map a rusqlite error into the store's error type
pub(crate) fn engine_err(e: rusqlite::Error) -> Error {
    Error::Engine(e.to_string())
}

/// Whether the engine failed because a table does not exist
fn is_missing_table(e: &rusqlite::Error) -> bool {
    e.to_string().contains("no such table")
}

/// Handle to an open document store
pub struct Store {
    conn: Mutex<Connection>,
    config: StoreConfig,
    provisioned: Mutex<HashSet<CollectionName>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.config.path)
            .field("journal_mode", &self.config.journal_mode)
            .finish()
    }
}

impl Store {
    /// Open a store with the given configuration
    ///
    /// Creates the parent directory of the storage file if needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be created and
    /// `Error::Engine` if the file cannot be opened or configured.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory().map_err(engine_err)?
        } else {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Connection::open(&config.path).map_err(engine_err)?
        };

        let requested = config.journal_mode.pragma_value();
        let journal_mode: String = conn
            .pragma_update_and_check(None, "journal_mode", requested, |row| row.get(0))
            .map_err(engine_err)?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)
            .map_err(engine_err)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(engine_err)?;

        if !journal_mode.eq_ignore_ascii_case(requested) {
            warn!(
                target: "docket::store",
                requested,
                effective = %journal_mode,
                "Engine did not accept requested journal mode"
            );
        }

        info!(
            target: "docket::store",
            path = ?config.path,
            journal_mode = %journal_mode,
            foreign_keys = config.foreign_keys,
            "Store opened"
        );

        Ok(Store {
            conn: Mutex::new(conn),
            config,
            provisioned: Mutex::new(HashSet::new()),
        })
    }

    /// Open a store on the given file with default settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(StoreConfig::new(path.as_ref()))
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Self::open(StoreConfig::in_memory())
    }

    /// The configuration this store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `f` against the connection
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn).map_err(engine_err)
    }

    /// Run `f` against the table of `name`
    ///
    /// If the table has disappeared since it was provisioned, it is
    /// recreated and `f` runs once more.
    pub(crate) fn with_table<F, T>(&self, name: &CollectionName, f: F) -> Result<T>
    where
        F: Fn(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock();
        match f(&conn) {
            Err(e) if is_missing_table(&e) => {
                warn!(
                    target: "docket::provision",
                    collection = %name,
                    "Collection table missing, reprovisioning"
                );
                provision::create_collection_table(&conn, name).map_err(engine_err)?;
                f(&conn).map_err(engine_err)
            }
            result => result.map_err(engine_err),
        }
    }

    /// Run `f` against the connection with mutable access (transactions)
    pub(crate) fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Validate `name` and make sure its table exists
    ///
    /// Idempotent. The DDL runs at most once per collection per store.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCollectionName` before touching storage if the
    /// name is unsafe, and `Error::Engine` if the DDL fails.
    pub fn ensure_collection(&self, name: &str) -> Result<CollectionName> {
        let name = sanitize_collection_name(name)?;
        if self.provisioned.lock().contains(&name) {
            return Ok(name);
        }

        self.with_conn(|conn| provision::create_collection_table(conn, &name))?;
        debug!(target: "docket::provision", collection = %name, "Collection provisioned");
        self.provisioned.lock().insert(name.clone());
        Ok(name)
    }

    /// Handle to a validated, provisioned collection
    pub fn collection(&self, name: &str) -> Result<Collection<'_>> {
        let name = self.ensure_collection(name)?;
        Ok(Collection::new(self, name))
    }

    /// Names of the document collections present in the file
    pub fn list_collections(&self) -> Result<Vec<String>> {
        self.with_conn(provision::list_collection_tables)
    }

    /// Drop a collection and all its documents
    ///
    /// Returns `true` if a table was removed.
    pub fn drop_collection(&self, name: &str) -> Result<bool> {
        let name = sanitize_collection_name(name)?;
        let existed = self.with_conn(|conn| provision::drop_collection_table(conn, &name))?;
        self.provisioned.lock().remove(&name);
        if existed {
            info!(target: "docket::provision", collection = %name, "Collection dropped");
        }
        Ok(existed)
    }

    /// Provision `name`, folding engine failures into a write failure
    fn writable(&self, name: &str) -> Result<std::result::Result<Collection<'_>, String>> {
        match self.collection(name) {
            Ok(coll) => Ok(Ok(coll)),
            Err(e) if e.is_input_error() => Err(e),
            Err(e) => {
                warn!(
                    target: "docket::store",
                    collection = name,
                    error = %e,
                    "Collection unavailable"
                );
                Ok(Err(e.to_string()))
            }
        }
    }

    // ========================================================================
    // Name-taking operations
    // ========================================================================

    /// Insert a document, generating an id if absent
    ///
    /// See [`Collection::insert`].
    pub fn insert(&self, collection: &str, doc: Document) -> Result<bool> {
        match self.writable(collection)? {
            Ok(coll) => coll.insert(doc),
            Err(_) => Ok(false),
        }
    }

    /// Insert or fully replace the document `id`
    ///
    /// See [`Collection::upsert`].
    pub fn upsert(&self, collection: &str, doc: Document, id: &str) -> Result<WriteResult> {
        match self.writable(collection)? {
            Ok(coll) => coll.upsert(doc, id),
            Err(msg) => Ok(WriteResult::failed(msg)),
        }
    }

    /// Delete the document `id`
    ///
    /// See [`Collection::delete`].
    pub fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.collection(collection)?.delete(id)
    }

    /// Read the document `id`
    ///
    /// See [`Collection::get_one`].
    pub fn get_one(&self, collection: &str, id: &str) -> Result<Record> {
        self.collection(collection)?.get_one(id)
    }

    /// Every document, newest first
    pub fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        self.collection(collection)?.get_all()
    }

    /// The first `n` documents, newest first
    pub fn get_limited(&self, collection: &str, n: usize) -> Result<Vec<Record>> {
        self.collection(collection)?.get_limited(n)
    }

    /// Documents whose `field` equals `value`
    pub fn get_all_where_equals(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>> {
        self.collection(collection)?.get_all_where_equals(field, value)
    }

    /// Filtered, ordered, paginated read
    ///
    /// See [`Collection::query`].
    pub fn query(&self, collection: &str, options: &QueryOptions) -> Result<Vec<Record>> {
        self.collection(collection)?.query(options)
    }

    /// Number of documents matching `conditions`
    pub fn count(&self, collection: &str, conditions: &[Condition]) -> Result<u64> {
        self.collection(collection)?.count(conditions)
    }

    /// Shallow-merge `patch` onto the document `id`
    ///
    /// See [`Collection::update`].
    pub fn update(&self, collection: &str, id: &str, patch: Document) -> Result<WriteResult> {
        match self.writable(collection)? {
            Ok(coll) => coll.update(id, patch),
            Err(msg) => Ok(WriteResult::failed(msg)),
        }
    }

    /// Transactional batch upsert
    ///
    /// See [`Collection::upsert_many`].
    pub fn upsert_many(&self, collection: &str, docs: Vec<Document>) -> Result<BatchReport> {
        self.collection(collection)?.upsert_many(docs)
    }

    /// Delete every document matching `conditions`
    ///
    /// See [`Collection::delete_many`].
    pub fn delete_many(&self, collection: &str, conditions: &[Condition]) -> Result<WriteResult> {
        match self.writable(collection)? {
            Ok(coll) => coll.delete_many(conditions),
            Err(msg) => Ok(WriteResult::failed(msg)),
        }
    }
}
