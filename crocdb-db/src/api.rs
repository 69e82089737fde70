//! Catalog operations behind the uniform response envelope.
//!
//! Each operation opens its own read-only connection for the duration
//! of the call and maps every failure into the envelope's `info.error`.
//! The handle itself holds no connection and no state between calls.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;

use crate::queries::{self, Entry, Platform, SearchFilter};
use crate::response::{ApiError, Response};
use crate::schema::open_read_only;

/// Read-only handle on a catalog database.
///
/// Holds only the database path; a fresh connection is opened per
/// operation and released when the call returns, on success and failure
/// alike.
#[derive(Debug, Clone)]
pub struct Catalog {
    db_path: PathBuf,
}

#[derive(Serialize)]
struct EntryData {
    entry: Entry,
}

#[derive(Serialize)]
struct PlatformsData {
    platforms: BTreeMap<String, Platform>,
}

#[derive(Serialize)]
struct RegionsData {
    regions: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Search entries with the given filters; results are paginated and
    /// fully hydrated.
    pub fn search(&self, filter: &SearchFilter) -> Response {
        respond(
            "search",
            self.with_connection(|conn| Ok(queries::search_entries(conn, filter)?)),
        )
    }

    /// Fetch a single entry by slug, or a random one.
    ///
    /// With `random`, an empty catalog yields empty data rather than an
    /// error; a missing `slug` (when not random) is "Slug is required"
    /// and an unmatched slug is "Entry not found".
    pub fn entry(&self, slug: Option<&str>, random: bool) -> Response {
        let result = self.with_connection(|conn| {
            if random {
                return Ok(queries::random_entry(conn)?);
            }
            let slug = slug.ok_or(ApiError::SlugRequired)?;
            match queries::entry_by_slug(conn, slug)? {
                Some(entry) => Ok(Some(entry)),
                None => Err(ApiError::NotFound),
            }
        });
        match result {
            Ok(Some(entry)) => Response::ok(&EntryData { entry }),
            Ok(None) => Response::empty(),
            Err(err) => {
                log::warn!("entry failed: {err}");
                Response::error(&err)
            }
        }
    }

    /// All platforms in the reference table.
    pub fn platforms(&self) -> Response {
        respond(
            "platforms",
            self.with_connection(|conn| {
                Ok(PlatformsData {
                    platforms: queries::list_platforms(conn)?,
                })
            }),
        )
    }

    /// All regions in the reference table.
    pub fn regions(&self) -> Response {
        respond(
            "regions",
            self.with_connection(|conn| {
                Ok(RegionsData {
                    regions: queries::list_regions(conn)?,
                })
            }),
        )
    }

    /// Catalog statistics.
    pub fn info(&self) -> Response {
        respond(
            "info",
            self.with_connection(|conn| Ok(queries::catalog_info(conn)?)),
        )
    }

    /// Run `body` with a read-only connection scoped to this call. The
    /// connection closes when the call returns, on every exit path.
    fn with_connection<T>(
        &self,
        body: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = open_read_only(&self.db_path)?;
        body(&conn)
    }
}

fn respond<T: Serialize>(operation: &str, result: Result<T, ApiError>) -> Response {
    match result {
        Ok(payload) => Response::ok(&payload),
        Err(err) => {
            log::warn!("{operation} failed: {err}");
            Response::error(&err)
        }
    }
}
