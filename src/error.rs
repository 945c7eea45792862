//! Application error types for catalog-sync
//!
//! This module defines the error types shared across the crate.
//! All error types use `thiserror` for ergonomic error handling.
//!
//! Store-side validation failures (`userErrors`) are not errors here: they are
//! returned as data by the gateway and recorded per product by the orchestrator.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single remote call
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    /// Network timeout
    #[error("Network timeout")]
    NetworkTimeout,

    /// Connection refused
    #[error("Connection refused")]
    ConnectionRefused,

    /// Rate limited by the store, with the suggested delay if one was sent
    #[error("Rate limited{}", format_retry_after(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Server error
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Invalid data received
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Endpoint not found (wrong store domain or API version)
    #[error("Resource not found")]
    NotFound,

    /// Access token rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Generic network error
    #[error("Network error: {0}")]
    Network(String),

    /// Top-level GraphQL errors returned without usable data
    #[error("GraphQL error: {0}")]
    GraphQl(String),
}

fn format_retry_after(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(", retry after {} ms", wait.as_millis()),
        None => String::new(),
    }
}

/// Errors raised while reading the input spreadsheet export
#[derive(Debug, Error)]
pub enum InputError {
    /// IO error while reading an input file
    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("Invalid CSV in {file}: {message}")]
    Csv { file: String, message: String },

    /// Required columns are absent from the header row
    #[error("Missing required columns in {file}: {}", .columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    /// A data row has no grouping handle
    #[error("Row {line} in {file} has an empty handle")]
    MissingHandle { file: String, line: u64 },
}
