//! SQLite schema and connection helpers.
//!
//! The catalog database is built by the ingestion tool; the layout here
//! mirrors it so tests and local tooling can create fixture databases.
//! The query layer itself only ever opens read-only connections.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Open the catalog database read-only. Fails if the file does not exist.
pub fn open_read_only(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Open or create a catalog database at the given path.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Create all tables and the search index if they don't exist.
///
/// Idempotent; safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- ROM entries
CREATE TABLE IF NOT EXISTS entries (
    slug TEXT PRIMARY KEY,
    rom_id TEXT NOT NULL,
    title TEXT NOT NULL,
    platform TEXT NOT NULL,
    boxart_url TEXT
);
CREATE INDEX IF NOT EXISTS idx_entries_rom_id ON entries(rom_id);
CREATE INDEX IF NOT EXISTS idx_entries_platform ON entries(platform);

-- Region associations (entries <-> regions, many-to-many)
CREATE TABLE IF NOT EXISTS regions_entries (
    entry TEXT NOT NULL REFERENCES entries(slug),
    region TEXT NOT NULL,
    PRIMARY KEY (entry, region)
);

-- Download links, owned by their entry
CREATE TABLE IF NOT EXISTS links (
    entry TEXT NOT NULL REFERENCES entries(slug),
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    format TEXT NOT NULL,
    url TEXT NOT NULL,
    filename TEXT NOT NULL,
    host TEXT NOT NULL,
    size INTEGER,
    size_str TEXT NOT NULL,
    source_url TEXT
);
CREATE INDEX IF NOT EXISTS idx_links_entry ON links(entry);

-- Reference data
CREATE TABLE IF NOT EXISTS platforms (
    id TEXT PRIMARY KEY,
    brand TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS regions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

-- Full-text index over normalized title keys. Ingestion keeps rowid in
-- step with entries.rowid and search_key equal to db_search_key(title).
-- Keys carry no separators, so token matching relies on trigrams.
CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(search_key, tokenize='trigram');
"#;
