use crocdb_db::search_key::db_search_key;
use crocdb_db::{Catalog, SearchFilter, open_database};
use rusqlite::{Connection, params};
use serde_json::json;
use tempfile::TempDir;

fn insert_entry(conn: &Connection, slug: &str, rom_id: &str, title: &str, platform: &str) {
    conn.execute(
        "INSERT INTO entries (slug, rom_id, title, platform, boxart_url)
         VALUES (?1, ?2, ?3, ?4, 'https://example.org/boxart.png')",
        params![slug, rom_id, title, platform],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO entries_fts (rowid, search_key) VALUES (?1, ?2)",
        params![conn.last_insert_rowid(), db_search_key(title)],
    )
    .unwrap();
}

/// Build a populated catalog database in a temp dir and hand back a
/// read-only handle on it.
fn fixture_catalog() -> (TempDir, Catalog) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roms.db");
    let conn = open_database(&path).unwrap();

    insert_entry(&conn, "chrono-trigger-snes", "CT001", "Chrono Trigger", "snes");
    insert_entry(&conn, "tetris-gb", "TET001", "Tetris", "gb");
    conn.execute(
        "INSERT INTO regions_entries (entry, region) VALUES ('chrono-trigger-snes', 'us')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO platforms (id, brand, name) VALUES ('snes', 'Nintendo', 'Super Nintendo')",
        [],
    )
    .unwrap();
    conn.execute("INSERT INTO regions (id, name) VALUES ('us', 'USA')", [])
        .unwrap();

    (dir, Catalog::new(path))
}

fn empty_catalog() -> (TempDir, Catalog) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roms.db");
    open_database(&path).unwrap();
    (dir, Catalog::new(path))
}

#[test]
fn search_returns_success_envelope() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.search(&SearchFilter {
        search_key: Some("chrono".to_string()),
        ..Default::default()
    });

    assert_eq!(response.info, json!({}));
    assert_eq!(response.data["total_results"], json!(1));
    assert_eq!(response.data["current_page"], json!(1));
    assert_eq!(response.data["total_pages"], json!(1));
    assert_eq!(
        response.data["results"][0]["slug"],
        json!("chrono-trigger-snes")
    );
    assert_eq!(response.data["results"][0]["regions"], json!(["us"]));
}

#[test]
fn entry_by_slug_wraps_entry_in_data() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.entry(Some("tetris-gb"), false);

    assert!(response.error_message().is_none());
    assert_eq!(response.data["entry"]["slug"], json!("tetris-gb"));
    assert_eq!(response.data["entry"]["rom_id"], json!("TET001"));
    assert_eq!(response.data["entry"]["links"], json!([]));
}

#[test]
fn entry_without_slug_is_a_client_error() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.entry(None, false);
    assert_eq!(response.error_message(), Some("Slug is required"));
    assert_eq!(response.data, json!({}));
}

#[test]
fn entry_with_unknown_slug_is_not_found() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.entry(Some("nonexistent"), false);
    assert_eq!(response.error_message(), Some("Entry not found"));
}

#[test]
fn random_entry_from_populated_catalog() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.entry(None, true);
    assert!(response.error_message().is_none());
    assert!(response.data["entry"]["slug"].is_string());
}

#[test]
fn random_entry_from_empty_catalog_is_empty_not_error() {
    let (_dir, catalog) = empty_catalog();
    let response = catalog.entry(None, true);
    assert!(response.error_message().is_none());
    assert_eq!(response.data, json!({}));
}

#[test]
fn platforms_and_regions_are_keyed_maps() {
    let (_dir, catalog) = fixture_catalog();

    let response = catalog.platforms();
    assert_eq!(
        response.data["platforms"]["snes"],
        json!({ "brand": "Nintendo", "name": "Super Nintendo" })
    );

    let response = catalog.regions();
    assert_eq!(response.data["regions"], json!({ "us": "USA" }));
}

#[test]
fn info_reports_total_entries() {
    let (_dir, catalog) = fixture_catalog();
    let response = catalog.info();
    assert_eq!(response.data, json!({ "total_entries": 2 }));
}

#[test]
fn missing_database_file_maps_to_operation_error() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::new(dir.path().join("does-not-exist.db"));
    let response = catalog.info();
    assert_eq!(response.error_message(), Some("Database operation failed"));
    assert_eq!(response.data, json!({}));
}

#[test]
fn link_type_serializes_under_wire_name() {
    let (_dir, catalog) = fixture_catalog();
    {
        let conn = open_database(catalog.db_path()).unwrap();
        conn.execute(
            "INSERT INTO links (entry, name, type, format, url, filename, host, size, size_str, source_url)
             VALUES ('tetris-gb', 'Tetris (World)', 'rom', 'zip',
                     'https://example.org/tetris.zip', 'tetris.zip', 'example.org',
                     65536, '64 KiB', NULL)",
            [],
        )
        .unwrap();
    }

    let response = catalog.entry(Some("tetris-gb"), false);
    let link = &response.data["entry"]["links"][0];
    assert_eq!(link["type"], json!("rom"));
    assert_eq!(link["size"], json!(65536));
    assert_eq!(link["size_str"], json!("64 KiB"));
    assert_eq!(link["source_url"], json!(null));
}
