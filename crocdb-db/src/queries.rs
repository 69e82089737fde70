//! Read queries for the ROM catalog database.
//!
//! Filtered, paginated search plus single-entry and reference-data
//! lookups. Every query here is read-only; matched entries are returned
//! fully hydrated with their region and link collections.

use std::collections::BTreeMap;

use rusqlite::{Connection, params};
use serde::Serialize;
use thiserror::Error;

use crate::search_key::{db_search_key, match_expression};

/// Upper bound on results per page.
pub const MAX_RESULTS_CEILING: u32 = 100;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// ── Row Types ───────────────────────────────────────────────────────────────

/// A catalog entry with its denormalized regions and links.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub slug: String,
    pub rom_id: String,
    pub title: String,
    pub platform: String,
    pub boxart_url: Option<String>,
    pub regions: Vec<String>,
    pub links: Vec<Link>,
}

/// A download link belonging to an entry. Pure value record; links have
/// no identity beyond the entry that owns them.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub format: String,
    pub url: String,
    pub filename: String,
    pub host: String,
    pub size: Option<i64>,
    pub size_str: String,
    pub source_url: Option<String>,
}

/// A platform row from the reference table.
#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub brand: String,
    pub name: String,
}

/// Catalog-level statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogInfo {
    pub total_entries: i64,
}

/// Root projection of an entry row, before hydration.
#[derive(Debug)]
struct EntrySummary {
    slug: String,
    rom_id: String,
    title: String,
    platform: String,
    boxart_url: Option<String>,
}

// ── Search ──────────────────────────────────────────────────────────────────

/// Filters for a catalog search. All present filters combine with AND.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    /// Free-text key, matched against the full-text index.
    pub search_key: Option<String>,
    /// Platform codes; empty means no platform filter.
    pub platforms: Vec<String>,
    /// Region codes; empty means no region filter.
    pub regions: Vec<String>,
    /// Exact ROM id.
    pub rom_id: Option<String>,
    /// Results per page, clamped to `1..=MAX_RESULTS_CEILING`.
    pub max_results: u32,
    /// 1-based page number, clamped down to the last page.
    pub page: u32,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            search_key: None,
            platforms: Vec::new(),
            regions: Vec::new(),
            rom_id: None,
            max_results: MAX_RESULTS_CEILING,
            page: 1,
        }
    }
}

/// One page of search results with pagination metadata.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub results: Vec<Entry>,
    pub current_results: usize,
    pub total_results: i64,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Search catalog entries using the given filters.
///
/// Entries without any region association pass every region filter; a
/// region filter narrows which entries are returned, not which of their
/// regions are shown.
pub fn search_entries(conn: &Connection, filter: &SearchFilter) -> Result<SearchPage, QueryError> {
    let max_results = filter.max_results.clamp(1, MAX_RESULTS_CEILING);
    let page = filter.page.max(1);

    let mut sql = String::from(
        "SELECT DISTINCT e.slug, e.rom_id, e.title, e.platform, e.boxart_url FROM entries e",
    );
    let mut where_clauses: Vec<String> = Vec::new();
    let mut query_params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    // A key that normalizes to nothing (all symbols) is no text filter.
    let match_expr = filter
        .search_key
        .as_deref()
        .map(match_expression)
        .filter(|expr| !expr.is_empty());

    if let Some(expr) = &match_expr {
        sql.push_str(" JOIN entries_fts ON entries_fts.rowid = e.rowid");
        where_clauses.push("entries_fts MATCH ?".to_string());
        query_params.push(Box::new(expr.clone()));
    }

    if !filter.platforms.is_empty() {
        let placeholders = vec!["?"; filter.platforms.len()].join(",");
        where_clauses.push(format!("e.platform IN ({placeholders})"));
        for platform in &filter.platforms {
            query_params.push(Box::new(platform.clone()));
        }
    }

    if !filter.regions.is_empty() {
        sql.push_str(" LEFT JOIN regions_entries re ON re.entry = e.slug");
        let placeholders = vec!["?"; filter.regions.len()].join(",");
        // Entries with no region association always pass the filter.
        where_clauses.push(format!(
            "(re.region IN ({placeholders}) OR re.region IS NULL)"
        ));
        for region in &filter.regions {
            query_params.push(Box::new(region.clone()));
        }
    }

    if let Some(rom_id) = &filter.rom_id {
        where_clauses.push("e.rom_id = ?".to_string());
        query_params.push(Box::new(rom_id.clone()));
    }

    if !where_clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clauses.join(" AND "));
    }

    let count_sql = format!("SELECT COUNT(*) FROM ({sql})");
    let total_results: i64 = {
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();
        conn.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?
    };

    let per_page = i64::from(max_results);
    let total_pages = ((total_results + per_page - 1) / per_page).max(1) as u32;
    let page = page.min(total_pages);
    let offset = i64::from(page - 1) * per_page;

    if match_expr.is_some() {
        // Exact-prefix matches first, slug as the stable tie-break.
        sql.push_str(" ORDER BY (entries_fts.search_key LIKE ? || '%') DESC, e.slug");
        let prefix = db_search_key(filter.search_key.as_deref().unwrap_or_default());
        query_params.push(Box::new(prefix));
    }
    sql.push_str(" LIMIT ? OFFSET ?");
    query_params.push(Box::new(per_page));
    query_params.push(Box::new(offset));

    log::debug!("search: {sql}");

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        query_params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(param_refs.as_slice(), row_to_summary)?;
    let summaries = rows.collect::<Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(summaries.len());
    for summary in summaries {
        results.push(hydrate_entry(conn, summary)?);
    }

    Ok(SearchPage {
        current_results: results.len(),
        results,
        total_results,
        current_page: page,
        total_pages,
    })
}

// ── Entry Lookups ───────────────────────────────────────────────────────────

/// Look up a single entry by its slug, fully hydrated.
pub fn entry_by_slug(conn: &Connection, slug: &str) -> Result<Option<Entry>, QueryError> {
    let mut stmt = conn.prepare(
        "SELECT slug, rom_id, title, platform, boxart_url FROM entries WHERE slug = ?1",
    )?;
    let result = stmt.query_row(params![slug], row_to_summary);
    match result {
        Ok(summary) => Ok(Some(hydrate_entry(conn, summary)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick one entry uniformly at random, or `None` if the catalog is empty.
pub fn random_entry(conn: &Connection) -> Result<Option<Entry>, QueryError> {
    let mut stmt = conn.prepare(
        "SELECT slug, rom_id, title, platform, boxart_url
         FROM entries ORDER BY RANDOM() LIMIT 1",
    )?;
    let result = stmt.query_row([], row_to_summary);
    match result {
        Ok(summary) => Ok(Some(hydrate_entry(conn, summary)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Hydration ───────────────────────────────────────────────────────────────

/// All region codes associated with an entry. Always the complete set,
/// regardless of any region filter used to find the entry.
pub fn entry_regions(conn: &Connection, slug: &str) -> Result<Vec<String>, QueryError> {
    let mut stmt = conn.prepare("SELECT region FROM regions_entries WHERE entry = ?1")?;
    let rows = stmt.query_map(params![slug], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All download links belonging to an entry.
pub fn entry_links(conn: &Connection, slug: &str) -> Result<Vec<Link>, QueryError> {
    let mut stmt = conn.prepare(
        "SELECT name, type, format, url, filename, host, size, size_str, source_url
         FROM links WHERE entry = ?1",
    )?;
    let rows = stmt.query_map(params![slug], row_to_link)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn hydrate_entry(conn: &Connection, summary: EntrySummary) -> Result<Entry, QueryError> {
    let regions = entry_regions(conn, &summary.slug)?;
    let links = entry_links(conn, &summary.slug)?;
    Ok(Entry {
        slug: summary.slug,
        rom_id: summary.rom_id,
        title: summary.title,
        platform: summary.platform,
        boxart_url: summary.boxart_url,
        regions,
        links,
    })
}

// ── Reference Data ──────────────────────────────────────────────────────────

/// All platforms, keyed by platform id.
pub fn list_platforms(conn: &Connection) -> Result<BTreeMap<String, Platform>, QueryError> {
    let mut stmt = conn.prepare("SELECT id, brand, name FROM platforms")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Platform {
                brand: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;
    rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
}

/// All regions, keyed by region id.
pub fn list_regions(conn: &Connection) -> Result<BTreeMap<String, String>, QueryError> {
    let mut stmt = conn.prepare("SELECT id, name FROM regions")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
}

/// Overall catalog statistics.
pub fn catalog_info(conn: &Connection) -> Result<CatalogInfo, QueryError> {
    let total_entries: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))?;
    Ok(CatalogInfo { total_entries })
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntrySummary> {
    Ok(EntrySummary {
        slug: row.get(0)?,
        rom_id: row.get(1)?,
        title: row.get(2)?,
        platform: row.get(3)?,
        boxart_url: row.get(4)?,
    })
}

fn row_to_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        name: row.get(0)?,
        kind: row.get(1)?,
        format: row.get(2)?,
        url: row.get(3)?,
        filename: row.get(4)?,
        host: row.get(5)?,
        size: row.get(6)?,
        size_str: row.get(7)?,
        source_url: row.get(8)?,
    })
}
