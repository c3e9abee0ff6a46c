//! Table provisioning
//!
//! One table per collection, four columns:
//!
//! | column       | type | notes                          |
//! |--------------|------|--------------------------------|
//! | `id`         | TEXT | primary key                    |
//! | `data`       | TEXT | encoded payload                |
//! | `created_at` | TEXT | set on first write, never again|
//! | `updated_at` | TEXT | refreshed on every write       |
//!
//! plus an index on each timestamp. There is no registry and no migration
//! step; `CREATE ... IF NOT EXISTS` makes provisioning idempotent.
//!
//! Indexes share the engine's table namespace. Their names contain `.`,
//! which no collection name can, so an index never collides with a
//! collection.

use docket_core::CollectionName;
use rusqlite::{Connection, OptionalExtension};

/// Physical column layout of a collection table, in declaration order
pub const COLLECTION_COLUMNS: [&str; 4] = ["id", "data", "created_at", "updated_at"];

fn index_name(name: &CollectionName, column: &str) -> String {
    format!("\"idx.{}.{}\"", name.as_str(), column)
}

/// DDL that creates the table and its indexes if absent
pub fn collection_ddl(name: &CollectionName) -> String {
    let table = name.quoted();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id         TEXT PRIMARY KEY NOT NULL,
            data       TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS {created} ON {table}(created_at);
        CREATE INDEX IF NOT EXISTS {updated} ON {table}(updated_at);",
        table = table,
        created = index_name(name, "created_at"),
        updated = index_name(name, "updated_at"),
    )
}

/// Create the collection's table and indexes if they do not exist
pub fn create_collection_table(conn: &Connection, name: &CollectionName) -> rusqlite::Result<()> {
    conn.execute_batch(&collection_ddl(name))
}

/// Drop the collection's table; returns whether it existed
pub fn drop_collection_table(conn: &Connection, name: &CollectionName) -> rusqlite::Result<bool> {
    let existed = table_exists(conn, name.as_str())?;
    if existed {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", name.quoted()))?;
    }
    Ok(existed)
}

/// Whether a table named `name` exists, compared case-insensitively
pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        [name],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// Names of tables whose columns match the collection layout, sorted
pub fn list_collection_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut columns_stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let mut collections = Vec::with_capacity(tables.len());
    for table in tables {
        let columns = columns_stmt
            .query_map([&table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if columns == COLLECTION_COLUMNS {
            collections.push(table);
        }
    }
    Ok(collections)
}
