//! Read-only SQLite query layer for the crocdb ROM catalog.
//!
//! Provides search-key normalization, filtered full-text search with
//! pagination, and single-entry lookups backed by SQLite (via rusqlite
//! with bundled feature). The catalog database is produced by the
//! ingestion tool; this crate never writes to it.

pub mod api;
pub mod queries;
pub mod response;
pub mod schema;
pub mod search_key;

pub use api::Catalog;
pub use queries::{
    catalog_info, entry_by_slug, entry_links, entry_regions, list_platforms, list_regions,
    random_entry, search_entries, CatalogInfo, Entry, Link, Platform, QueryError, SearchFilter,
    SearchPage,
};
pub use response::{ApiError, Response};
pub use schema::{open_database, open_memory, open_read_only};
pub use search_key::{db_search_key, match_expression, normalize_repeated_chars, valid_search_key};
