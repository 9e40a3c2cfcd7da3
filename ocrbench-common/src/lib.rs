//! # OCR Bench Common Library
//!
//! Shared code for the OCR benchmark dashboard crates:
//! - Data model for manifests, per-subcategory results and per-image records
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Common error type

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{
    AggregatedData, CategoryLayout, ImageModelResult, ImageResult, Manifest, MetricSummary,
    ModelAverage, ModelLinks, SubcategoryLayout, SubcategoryResult,
};
