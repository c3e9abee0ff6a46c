//! SQLite-backed document store
//!
//! This crate emulates schema-less document collections on top of an
//! embedded relational engine:
//! - `Store`: the connection handle and collection provisioning
//! - `Collection`: CRUD, query, count, partial update and bulk operations
//! - `StoreConfig`: file location and connection pragmas (`docket.toml`)
//!
//! Each collection is one table (`id`, `data`, `created_at`, `updated_at`)
//! created on first use. Filtering runs `json_extract` over the payload
//! column with every value bound as a parameter.
//!
//! ## Quick Start
//!
//! ```
//! use docket_engine::Store;
//! use docket_core::{Condition, Document};
//!
//! let store = Store::open_in_memory()?;
//! let cases = store.collection("cases")?;
//! cases.upsert(Document::new().with("status", "active"), "case-1")?;
//!
//! let active = cases.get_all_where_equals("status", "active")?;
//! assert_eq!(active.len(), 1);
//! assert_eq!(cases.count(&[Condition::eq("status", "closed")])?, 0);
//! # Ok::<(), docket_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod batch;
mod collection;
pub mod config;
pub mod predicate;
pub mod provision;
mod row;
mod store;

pub use collection::Collection;
pub use config::{JournalMode, StoreConfig, PATH_ENV_VAR};
pub use predicate::{build_where, WhereClause};
pub use store::Store;
