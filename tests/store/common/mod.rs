//! Shared test utilities for the store suite.

#![allow(dead_code)]

use docket::{Document, Store, StoreConfig};
use std::sync::Once;
use tempfile::TempDir;

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output through the test harness once per process.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// On-disk store in a temporary directory.
pub struct TestStore {
    pub store: Store,
    pub dir: TempDir,
}

impl TestStore {
    /// Store with default settings (WAL, shallow decode).
    pub fn new() -> Self {
        Self::with_config(|c| c)
    }

    /// Store with settings adjusted by `f`.
    pub fn with_config(f: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        init_logging();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = f(StoreConfig::new(dir.path().join("docket.db")));
        let store = Store::open(config).expect("Failed to open test store");
        TestStore { store, dir }
    }

    /// Reopen the same file with default settings.
    pub fn reopen(self) -> Self {
        let TestStore { store, dir } = self;
        drop(store);
        let store = Store::open_path(dir.path().join("docket.db")).expect("Failed to reopen");
        TestStore { store, dir }
    }
}

/// A case document with a status and a priority.
pub fn case(id: &str, status: &str, priority: i64) -> Document {
    Document::with_id(id)
        .with("status", status)
        .with("priority", priority)
}
