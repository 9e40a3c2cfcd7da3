//! Error types for ocrbench-dash
//!
//! Two layers:
//! - [`FetchError`]: one failed fetch (timeout, HTTP status, transport, body)
//! - [`LoadError`]: a load that left no usable data for the current view
//!
//! Per-file and per-entry problems alongside usable data are not errors;
//! they are collected into the load reports ([`FileFailure`], [`EntryRejection`]).

use serde::Serialize;
use thiserror::Error;

/// Fetch gateway errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// No complete response within the budget; the transfer was aborted
    #[error("Timeout loading {url} after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Connection, TLS or body transfer failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Body is not valid JSON
    #[error("Parse error for {url}: {message}")]
    Parse { url: String, message: String },

    /// Path could not be resolved against the data base URL
    #[error("Invalid URL {0}")]
    InvalidUrl(String),

    /// Gateway cancellation token fired before the fetch completed
    #[error("Cancelled loading {url}")]
    Cancelled { url: String },
}

/// Load errors that leave the current view without data
#[derive(Debug, Error)]
pub enum LoadError {
    /// Manifest missing, unparsable or empty
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Every listed result file failed
    #[error("No JSON files could be loaded from the manifest ({attempted} attempted)")]
    NoData { attempted: usize },

    /// The manifest enumerates no per-image files for this subcategory
    #[error("No individual files found for {category}/{subcategory}")]
    NoIndividualFiles {
        category: String,
        subcategory: String,
    },

    /// Every per-image fetch failed
    #[error("No individual files could be loaded for {category}/{subcategory} ({attempted} attempted)")]
    NoDetailData {
        category: String,
        subcategory: String,
        attempted: usize,
    },

    /// A view was requested before a successful full load
    #[error("Benchmark data has not been loaded")]
    NotLoaded,
}

/// One result file that could not be loaded (non-fatal)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub reason: String,
}

/// One model entry dropped during validation (non-fatal)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryRejection {
    pub file: String,
    pub model: String,
    pub reason: String,
}
