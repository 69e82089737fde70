//! Uniform response envelope and the operation error taxonomy.
//!
//! Every operation returns `{info, data}`: `info` is empty on success
//! and carries `{"error": message}` on failure; `data` carries the
//! payload on success and is empty otherwise. Errors never escape an
//! operation as anything but this envelope.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::queries::QueryError;
use crate::schema::SchemaError;

/// Failure kinds surfaced by catalog operations.
///
/// The display strings are the exact wire-level messages; internal
/// detail is never leaked through them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Query or connection execution failed at the SQLite level.
    #[error("Database operation failed")]
    Operation,
    /// Lower-level driver or data fault.
    #[error("A database error occurred")]
    Database,
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Slug is required")]
    SlugRequired,
    #[error("Entry not found")]
    NotFound,
    /// Catch-all; no fault escapes an operation unclassified.
    #[error("An unexpected error occurred")]
    Unexpected,
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(..) => ApiError::Operation,
            rusqlite::Error::InvalidParameterName(_)
            | rusqlite::Error::InvalidParameterCount(..)
            | rusqlite::Error::InvalidQuery => ApiError::InvalidInput,
            _ => ApiError::Database,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Sqlite(e) => e.into(),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Sqlite(e) => e.into(),
        }
    }
}

/// The universal `{info, data}` envelope.
#[derive(Debug, Serialize)]
pub struct Response {
    pub info: Value,
    pub data: Value,
}

impl Response {
    /// Success with a payload.
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(data) => Self {
                info: json!({}),
                data,
            },
            Err(_) => Self::error(&ApiError::Unexpected),
        }
    }

    /// Success with empty data, e.g. a random draw from an empty catalog.
    pub fn empty() -> Self {
        Self {
            info: json!({}),
            data: json!({}),
        }
    }

    /// Failure, with the error message under `info.error`.
    pub fn error(err: &ApiError) -> Self {
        Self {
            info: json!({ "error": err.to_string() }),
            data: json!({}),
        }
    }

    /// The `info.error` message, if this is an error response.
    pub fn error_message(&self) -> Option<&str> {
        self.info.get("error").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_has_empty_info() {
        let response = Response::ok(&json!({ "total_entries": 3 }));
        assert_eq!(response.info, json!({}));
        assert_eq!(response.data, json!({ "total_entries": 3 }));
        assert!(response.error_message().is_none());
    }

    #[test]
    fn error_envelope_has_empty_data() {
        let response = Response::error(&ApiError::NotFound);
        assert_eq!(response.error_message(), Some("Entry not found"));
        assert_eq!(response.data, json!({}));
    }

    #[test]
    fn empty_envelope_is_not_an_error() {
        let response = Response::empty();
        assert!(response.error_message().is_none());
        assert_eq!(response.data, json!({}));
    }

    #[test]
    fn sqlite_failure_maps_to_operation_error() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            None,
        );
        assert_eq!(ApiError::from(err), ApiError::Operation);
    }

    #[test]
    fn driver_fault_maps_to_database_error() {
        let err = rusqlite::Error::QueryReturnedNoRows;
        assert_eq!(ApiError::from(err), ApiError::Database);
    }
}
