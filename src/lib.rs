//! Docket - schema-less document collections over embedded SQLite
//!
//! Docket stores JSON-shaped documents in named collections, one SQLite
//! table per collection, with simple AND-combined field filtering,
//! pagination and transactional batch writes.
//!
//! # Quick Start
//!
//! ```
//! use docket::{Condition, Document, QueryOptions, OrderBy, Store};
//!
//! let store = Store::open_in_memory()?;
//! let hearings = store.collection("hearings")?;
//!
//! hearings.upsert(Document::new().with("room", "4B").with("day", 3), "h-1")?;
//! hearings.upsert(Document::new().with("room", "2A").with("day", 1), "h-2")?;
//!
//! let first = hearings.query(
//!     &QueryOptions::new()
//!         .filter(Condition::ge("day", 1))
//!         .order_by(OrderBy::asc("day"))
//!         .limit(1),
//! )?;
//! assert_eq!(first[0].id, "h-2");
//! # Ok::<(), docket::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `docket-core`: validation, value model, codec, query types, errors
//! - `docket-engine`: SQLite store, provisioning, predicate compilation, CRUD
//!
//! Both are re-exported here.

pub use docket_core::*;
pub use docket_engine::{
    build_where, config, predicate, provision, Collection, JournalMode, Store, StoreConfig,
    WhereClause, PATH_ENV_VAR,
};
