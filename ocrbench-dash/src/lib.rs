//! # ocrbench-dash
//!
//! Core of the OCR benchmark dashboard:
//! - Fetch gateway: timeout-bounded, cache-bypassing JSON fetches
//! - Manifest loader: parallel all-settled load of every result file
//! - Aggregation engine: weighted model averages, best scores, ranking
//! - Detail loader: cached per-image results with validation
//! - View router and word diff
//!
//! Rendering to text or JSON lives in [`render`]; the `ocrbench` binary
//! wires everything to a command line.

pub mod aggregate;
pub mod dashboard;
pub mod detail;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod render;
pub mod view;

pub use dashboard::{Dashboard, DashboardContext, DetailScreen, Screen};
pub use error::{EntryRejection, FetchError, FileFailure, LoadError};
pub use fetch::{HttpFetcher, JsonFetcher};
pub use manifest::{LoadReport, ManifestLoader};
pub use view::{Navigator, View};
