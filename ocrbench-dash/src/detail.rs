//! Detail loader
//!
//! Per-image results for one subcategory, loaded on demand when the user
//! opens the detail view. Loaded files are cached by path for the life of
//! the loader; a cached path is never fetched again.

use crate::error::{EntryRejection, FileFailure, LoadError};
use crate::fetch::JsonFetcher;
use crate::manifest::json_kind;
use futures::future::join_all;
use ocrbench_common::{Error, ImageModelResult, ImageResult, Manifest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// One per-image file that produced (or reused) an [`ImageResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFile {
    pub file: String,
    /// Served from the cache without a fetch
    pub cached: bool,
}

/// Outcome of loading a batch of per-image files
#[derive(Debug, Clone, Default)]
pub struct DetailBatch {
    pub successful: Vec<LoadedFile>,
    pub failed: Vec<FileFailure>,
    /// Model entries dropped while normalising freshly fetched files
    pub rejected: Vec<EntryRejection>,
    /// Path → normalised result
    pub data: BTreeMap<String, Arc<ImageResult>>,
}

impl DetailBatch {
    pub fn images(&self) -> impl Iterator<Item = &ImageResult> {
        self.data.values().map(Arc::as_ref)
    }
}

/// Loads and caches per-image result files
pub struct IndividualFileLoader {
    fetcher: Arc<dyn JsonFetcher>,
    timeout: Duration,
    cache: RwLock<HashMap<String, Arc<ImageResult>>>,
}

impl IndividualFileLoader {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Load every path in parallel, reusing cached results
    pub async fn load_individual_files(&self, paths: &[String]) -> DetailBatch {
        let loads = paths.iter().map(|path| async move {
            let outcome = self.load_one(path).await;
            (path, outcome)
        });
        let outcomes = join_all(loads).await;

        let mut batch = DetailBatch::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok((image, cached, mut rejected)) => {
                    batch.successful.push(LoadedFile {
                        file: path.clone(),
                        cached,
                    });
                    batch.rejected.append(&mut rejected);
                    batch.data.insert(path.clone(), image);
                }
                Err(reason) => {
                    warn!(file = %path, %reason, "Failed to load individual file");
                    batch.failed.push(FileFailure {
                        file: path.clone(),
                        reason,
                    });
                }
            }
        }

        debug!(
            requested = paths.len(),
            loaded = batch.successful.len(),
            failed = batch.failed.len(),
            "Individual files processed"
        );
        batch
    }

    async fn load_one(
        &self,
        path: &str,
    ) -> Result<(Arc<ImageResult>, bool, Vec<EntryRejection>), String> {
        let cached = self.cache.read().await.get(path).cloned();
        if let Some(image) = cached {
            return Ok((image, true, Vec::new()));
        }

        let value = self
            .fetcher
            .fetch_json(path, self.timeout)
            .await
            .map_err(|e| e.to_string())?;
        let (image, rejected) = process_image_data(path, value)?;

        // First writer wins if the same path was loaded concurrently
        let image = self
            .cache
            .write()
            .await
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(image))
            .clone();

        Ok((image, false, rejected))
    }

    /// Load the per-image files the manifest lists for one subcategory
    pub async fn load_subcategory(
        &self,
        manifest: &Manifest,
        category: &str,
        subcategory: &str,
    ) -> Result<DetailBatch, LoadError> {
        let files = manifest
            .subcategory(category, subcategory)
            .map(|s| s.individual_files.as_slice())
            .filter(|files| !files.is_empty())
            .ok_or_else(|| LoadError::NoIndividualFiles {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            })?;

        let batch = self.load_individual_files(files).await;

        if !batch.failed.is_empty() {
            error!(
                category,
                subcategory,
                failed = batch.failed.len(),
                "Some individual files failed to load"
            );
        }

        if batch.successful.is_empty() {
            return Err(LoadError::NoDetailData {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                attempted: files.len(),
            });
        }

        info!(
            category,
            subcategory,
            images = batch.data.len(),
            "Detail data loaded"
        );
        Ok(batch)
    }

    pub async fn is_cached(&self, path: &str) -> bool {
        self.cache.read().await.contains_key(path)
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}

/// Field that must be present but tolerates null or mistyped values
struct Lenient<T>(Option<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Lenient(serde_json::from_value(value).ok()))
    }
}

#[derive(Deserialize)]
struct RawImageEntry {
    gt: Lenient<String>,
    response: Lenient<String>,
    wer: Lenient<f64>,
    cer: Lenient<f64>,
    accuracy: Lenient<f64>,
    time: Lenient<f64>,
}

impl RawImageEntry {
    fn normalize(self) -> ImageModelResult {
        ImageModelResult {
            ground_truth: self.gt.0.unwrap_or_default(),
            response: self.response.0.unwrap_or_default(),
            wer: finite_or_zero(self.wer.0),
            cer: finite_or_zero(self.cer.0),
            accuracy: finite_or_zero(self.accuracy.0),
            time: finite_or_zero(self.time.0),
        }
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Normalise one per-image file
///
/// Entries missing any of `gt`, `response`, `wer`, `cer`, `accuracy`, `time`
/// are dropped; present but null or mistyped values become `""` or `0`.
pub fn process_image_data(
    path: &str,
    value: Value,
) -> Result<(ImageResult, Vec<EntryRejection>), String> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => {
            return Err(format!(
                "expected a JSON object of models, got {}",
                json_kind(&other)
            ))
        }
    };

    let mut models = BTreeMap::new();
    let mut rejected = Vec::new();

    for (model, raw) in entries {
        let decoded = if raw.is_object() {
            serde_json::from_value::<RawImageEntry>(raw).map_err(|e| e.to_string())
        } else {
            Err(format!("expected an object, got {}", json_kind(&raw)))
        };

        match decoded {
            Ok(entry) => {
                models.insert(model, entry.normalize());
            }
            Err(reason) => {
                warn!(file = path, model = %model, %reason, "Dropping invalid image entry");
                rejected.push(EntryRejection {
                    file: path.to_string(),
                    model,
                    reason,
                });
            }
        }
    }

    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let filename = last_segment
        .strip_suffix(".json")
        .unwrap_or(last_segment)
        .to_string();

    Ok((
        ImageResult {
            filename,
            file_path: path.to_string(),
            models,
        },
        rejected,
    ))
}

/// Display bucket for an accuracy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccuracyBand {
    VeryLow,
    Low,
    Medium,
    Good,
    Excellent,
}

impl AccuracyBand {
    pub fn for_accuracy(accuracy: f64) -> Self {
        if accuracy < 50.0 {
            AccuracyBand::VeryLow
        } else if accuracy < 75.0 {
            AccuracyBand::Low
        } else if accuracy < 85.0 {
            AccuracyBand::Medium
        } else if accuracy < 95.0 {
            AccuracyBand::Good
        } else {
            AccuracyBand::Excellent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccuracyBand::VeryLow => "very-low",
            AccuracyBand::Low => "low",
            AccuracyBand::Medium => "medium",
            AccuracyBand::Good => "good",
            AccuracyBand::Excellent => "excellent",
        }
    }
}

impl fmt::Display for AccuracyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image list ordering in the detail view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSort {
    #[default]
    FilenameAsc,
    FilenameDesc,
    AccuracyDesc,
    AccuracyAsc,
}

impl ImageSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSort::FilenameAsc => "filename-asc",
            ImageSort::FilenameDesc => "filename-desc",
            ImageSort::AccuracyDesc => "accuracy-desc",
            ImageSort::AccuracyAsc => "accuracy-asc",
        }
    }
}

impl fmt::Display for ImageSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filename-asc" => Ok(ImageSort::FilenameAsc),
            "filename-desc" => Ok(ImageSort::FilenameDesc),
            "accuracy-desc" => Ok(ImageSort::AccuracyDesc),
            "accuracy-asc" => Ok(ImageSort::AccuracyAsc),
            other => Err(Error::InvalidInput(format!(
                "unknown image sort {other:?} (expected filename-asc, filename-desc, accuracy-desc or accuracy-asc)"
            ))),
        }
    }
}

/// Order images for display; accuracy sorts use the per-image mean
pub fn sort_images<'a, I>(images: I, sort: ImageSort) -> Vec<&'a ImageResult>
where
    I: IntoIterator<Item = &'a ImageResult>,
{
    let mut sorted: Vec<&ImageResult> = images.into_iter().collect();
    match sort {
        ImageSort::FilenameAsc => sorted.sort_by(|a, b| a.filename.cmp(&b.filename)),
        ImageSort::FilenameDesc => sorted.sort_by(|a, b| b.filename.cmp(&a.filename)),
        ImageSort::AccuracyDesc => {
            sorted.sort_by(|a, b| b.average_accuracy().total_cmp(&a.average_accuracy()))
        }
        ImageSort::AccuracyAsc => {
            sorted.sort_by(|a, b| a.average_accuracy().total_cmp(&b.average_accuracy()))
        }
    }
    sorted
}

/// Restrict each image to one model; images without that model are dropped
pub fn filter_by_model<'a, I>(images: I, model: Option<&str>) -> Vec<ImageResult>
where
    I: IntoIterator<Item = &'a ImageResult>,
{
    images
        .into_iter()
        .filter_map(|image| match model {
            None => Some(image.clone()),
            Some(name) => image.models.get(name).map(|result| ImageResult {
                filename: image.filename.clone(),
                file_path: image.file_path.clone(),
                models: BTreeMap::from([(name.to_string(), result.clone())]),
            }),
        })
        .collect()
}

/// Every model name appearing in any image, sorted
pub fn model_names<'a, I>(images: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ImageResult>,
{
    images
        .into_iter()
        .flat_map(|image| image.models.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Scan image location relative to the data directory
pub fn image_path(category: &str, subcategory: &str, image: &ImageResult) -> String {
    format!(
        "images/{category}/{subcategory}/{}.webp",
        image.image_stem()
    )
}
