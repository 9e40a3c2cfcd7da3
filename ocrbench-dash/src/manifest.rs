//! Manifest loader
//!
//! Fetches the manifest, then every listed result file in parallel
//! (all-settled: one failure never cancels the others), classifies each
//! file into a category and builds a fresh [`AggregatedData`].
//!
//! Classification uses the file base name (directory and extension
//! stripped) as the subcategory. The first declared category containing
//! that name wins; unmatched files go to the configured default category.

use crate::error::{EntryRejection, FileFailure, LoadError};
use crate::fetch::JsonFetcher;
use futures::future::join_all;
use ocrbench_common::config::DashboardSettings;
use ocrbench_common::{AggregatedData, Manifest, MetricSummary, ModelLinks, SubcategoryResult};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of a full load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub aggregated: AggregatedData,
    /// Files that could not be fetched or were not a JSON object
    pub failures: Vec<FileFailure>,
    /// Model entries dropped from otherwise loaded files
    pub rejected: Vec<EntryRejection>,
    /// Number of files that contributed a subcategory
    pub loaded: usize,
}

/// Loads the manifest, the result files and the optional model links
pub struct ManifestLoader {
    fetcher: Arc<dyn JsonFetcher>,
    timeout: Duration,
    manifest_file: String,
    model_links_file: String,
    default_category: String,
}

impl ManifestLoader {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, settings: &DashboardSettings) -> Self {
        Self {
            fetcher,
            timeout: settings.timeout,
            manifest_file: settings.manifest_file.clone(),
            model_links_file: settings.model_links_file.clone(),
            default_category: settings.default_category.clone(),
        }
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    /// Fetch and decode the manifest
    ///
    /// Fatal when the fetch fails, the document does not decode, or it lists no files.
    pub async fn load_manifest(&self) -> Result<Manifest, LoadError> {
        let value = self
            .fetcher
            .fetch_json(&self.manifest_file, self.timeout)
            .await
            .map_err(|e| LoadError::Manifest(e.to_string()))?;

        let manifest: Manifest = serde_json::from_value(value)
            .map_err(|e| LoadError::Manifest(format!("unreadable manifest: {e}")))?;

        if manifest.files.is_empty() {
            return Err(LoadError::Manifest("No files listed in manifest".to_string()));
        }

        info!(
            files = manifest.files.len(),
            categories = manifest.categories().len(),
            generated = manifest.generated.as_deref().unwrap_or("unknown"),
            "Manifest loaded"
        );

        Ok(manifest)
    }

    /// Fetch every result file listed by `manifest` and aggregate them
    ///
    /// Always starts from an empty [`AggregatedData`]. Declared categories are
    /// present even when none of their files loaded.
    pub async fn load_all(&self, manifest: &Manifest) -> Result<LoadReport, LoadError> {
        let fetches = manifest.files.iter().map(|file| async move {
            let outcome = self.fetcher.fetch_json(file, self.timeout).await;
            (file.as_str(), outcome)
        });
        let outcomes = join_all(fetches).await;

        let mut report = LoadReport::default();
        for category in manifest.categories() {
            report.aggregated.ensure_category(&category.name);
        }

        for (file, outcome) in outcomes {
            let decoded = outcome
                .map_err(|e| e.to_string())
                .and_then(|value| decode_subcategory_result(file, value));

            match decoded {
                Ok((result, mut rejected)) => {
                    let subcategory = base_name(file);
                    let category = manifest
                        .classify(subcategory)
                        .unwrap_or(self.default_category.as_str());

                    debug!(
                        file,
                        category,
                        subcategory,
                        models = result.len(),
                        "Result file loaded"
                    );
                    report.aggregated.insert(category, subcategory, result);
                    report.rejected.append(&mut rejected);
                    report.loaded += 1;
                }
                Err(reason) => {
                    warn!(file, %reason, "Failed to load result file");
                    report.failures.push(FileFailure {
                        file: file.to_string(),
                        reason,
                    });
                }
            }
        }

        if report.loaded == 0 {
            return Err(LoadError::NoData {
                attempted: manifest.files.len(),
            });
        }

        info!(
            loaded = report.loaded,
            failed = report.failures.len(),
            rejected = report.rejected.len(),
            "Benchmark results aggregated"
        );

        Ok(report)
    }

    /// Fetch the model name → homepage map; any failure yields an empty map
    pub async fn load_model_links(&self) -> ModelLinks {
        let value = match self
            .fetcher
            .fetch_json(&self.model_links_file, self.timeout)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Model links unavailable");
                return ModelLinks::new();
            }
        };

        match value {
            Value::Object(entries) => entries
                .into_iter()
                .filter_map(|(model, url)| match url {
                    Value::String(url) => Some((model, url)),
                    _ => None,
                })
                .collect(),
            other => {
                warn!(kind = json_kind(&other), "Model links file is not a JSON object");
                ModelLinks::new()
            }
        }
    }
}

/// Subcategory name of a result file: last path segment without extension
pub fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file)
}

/// Decode one result file, keeping only entries that pass validation
///
/// The file fails only if it is not a JSON object; individual model entries
/// that do not decode or violate metric ranges are returned as rejections.
fn decode_subcategory_result(
    file: &str,
    value: Value,
) -> Result<(SubcategoryResult, Vec<EntryRejection>), String> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(format!(
                "expected a JSON object of models, got {}",
                json_kind(&other)
            ))
        }
    };

    let mut result = SubcategoryResult::new();
    let mut rejected = Vec::new();

    for (model, raw) in entries {
        let checked = serde_json::from_value::<MetricSummary>(raw)
            .map_err(|e| e.to_string())
            .and_then(|summary| summary.validate().map(|()| summary));

        match checked {
            Ok(summary) => {
                result.insert(model, summary);
            }
            Err(reason) => {
                warn!(file, model = %model, %reason, "Dropping invalid model entry");
                rejected.push(EntryRejection {
                    file: file.to_string(),
                    model,
                    reason,
                });
            }
        }
    }

    Ok((result, rejected))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
