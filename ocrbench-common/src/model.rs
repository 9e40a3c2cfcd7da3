//! Benchmark data model
//!
//! Shapes shared by the loaders, the aggregation engine and the renderers:
//! - [`Manifest`]: index of result files and the category/subcategory layout
//! - [`SubcategoryResult`]: per-model averages for one benchmark dataset
//! - [`AggregatedData`]: category → subcategory → [`SubcategoryResult`]
//! - [`ModelAverage`]: image-count-weighted averages for one model
//! - [`ImageResult`]: per-image ground truth / response pairs for the detail view
//!
//! The manifest exists in two wire shapes (legacy list-of-names and the
//! current per-subcategory object). Both are resolved once, at decode time,
//! into the canonical [`CategoryLayout`] list.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Manifest
// ============================================================================

/// Declared metadata for one subcategory (one benchmark dataset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryLayout {
    /// Subcategory name, matched against result file base names
    pub name: String,
    /// Declared number of images (0 when unknown or legacy manifest)
    pub image_count: u64,
    /// Per-image detail files, relative to the data root
    pub individual_files: Vec<String>,
}

/// Declared category with its subcategories in manifest order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLayout {
    pub name: String,
    pub subcategories: Vec<SubcategoryLayout>,
}

impl CategoryLayout {
    /// Look up a subcategory by name
    pub fn subcategory(&self, name: &str) -> Option<&SubcategoryLayout> {
        self.subcategories.iter().find(|s| s.name == name)
    }

    /// True if this category declares a subcategory with the given name
    pub fn contains(&self, name: &str) -> bool {
        self.subcategory(name).is_some()
    }
}

/// Manifest describing every result file and the category layout
///
/// Immutable once fetched. `structure` is `None` when the document has no
/// `structure` section at all (every file then lands in the default category).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawManifest")]
pub struct Manifest {
    /// Generation timestamp as written by the generator (ISO 8601)
    pub generated: Option<String>,
    /// Result files, relative to the data root, in manifest order
    pub files: Vec<String>,
    /// Canonical layout, categories in manifest order
    pub structure: Option<Vec<CategoryLayout>>,
}

impl Manifest {
    /// Declared categories (empty when the manifest has no structure)
    pub fn categories(&self) -> &[CategoryLayout] {
        self.structure.as_deref().unwrap_or(&[])
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&CategoryLayout> {
        self.categories().iter().find(|c| c.name == name)
    }

    /// Look up a subcategory by category and subcategory name
    pub fn subcategory(&self, category: &str, subcategory: &str) -> Option<&SubcategoryLayout> {
        self.category(category)
            .and_then(|c| c.subcategory(subcategory))
    }

    /// First category (manifest order) declaring `subcategory`
    pub fn classify(&self, subcategory: &str) -> Option<&str> {
        self.categories()
            .iter()
            .find(|c| c.contains(subcategory))
            .map(|c| c.name.as_str())
    }

    /// Sum of every declared image count
    pub fn declared_image_total(&self) -> u64 {
        self.categories()
            .iter()
            .flat_map(|c| c.subcategories.iter())
            .map(|s| s.image_count)
            .sum()
    }

    /// Parse the `generated` timestamp
    ///
    /// Accepts RFC 3339 (converted to UTC) and the offset-less form written by
    /// Python's `datetime.isoformat()`.
    pub fn generated_at(&self) -> Option<NaiveDateTime> {
        let raw = self.generated.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// Wire form of the manifest before shape resolution
#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    generated: Option<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    structure: Option<Map<String, Value>>,
}

/// The two accepted shapes of one `structure` entry
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategory {
    /// Legacy: `"Category": ["sub-a", "sub-b"]`
    Names(Vec<String>),
    /// Current: `"Category": { "sub-a": { "image_count": 3, ... } }`
    Detailed(Map<String, Value>),
}

#[derive(Deserialize)]
struct RawSubcategory {
    #[serde(default)]
    image_count: Option<u64>,
    #[serde(default)]
    individual_files: Option<Vec<String>>,
}

impl TryFrom<RawManifest> for Manifest {
    type Error = String;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        let structure = match raw.structure {
            None => None,
            Some(map) => {
                let mut categories = Vec::with_capacity(map.len());
                for (name, value) in map {
                    categories.push(resolve_category(name, value)?);
                }
                Some(categories)
            }
        };

        Ok(Manifest {
            generated: raw.generated,
            files: raw.files,
            structure,
        })
    }
}

fn resolve_category(name: String, value: Value) -> Result<CategoryLayout, String> {
    let raw: RawCategory = serde_json::from_value(value)
        .map_err(|e| format!("category {name:?}: {e}"))?;

    let subcategories = match raw {
        RawCategory::Names(names) => names
            .into_iter()
            .map(|name| SubcategoryLayout {
                name,
                image_count: 0,
                individual_files: Vec::new(),
            })
            .collect(),
        RawCategory::Detailed(map) => {
            let mut subs = Vec::with_capacity(map.len());
            for (sub_name, sub_value) in map {
                let info: RawSubcategory = serde_json::from_value(sub_value)
                    .map_err(|e| format!("subcategory {name:?}/{sub_name:?}: {e}"))?;
                subs.push(SubcategoryLayout {
                    name: sub_name,
                    image_count: info.image_count.unwrap_or(0),
                    individual_files: info.individual_files.unwrap_or_default(),
                });
            }
            subs
        }
    };

    Ok(CategoryLayout {
        name,
        subcategories,
    })
}

// ============================================================================
// Subcategory results
// ============================================================================

/// Per-model averages for one subcategory, as written by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Word error rate (%)
    pub avg_wer: f64,
    /// Character error rate (%)
    pub avg_cer: f64,
    /// Accuracy (%), 0-100
    pub avg_accuracy: f64,
    /// Mean processing time per image (seconds)
    pub avg_time: f64,
    /// Number of images this model was evaluated on
    #[serde(default)]
    pub images: u64,
}

impl MetricSummary {
    /// Check value ranges: metrics finite and non-negative, accuracy at most 100
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("avg_wer", self.avg_wer),
            ("avg_cer", self.avg_cer),
            ("avg_accuracy", self.avg_accuracy),
            ("avg_time", self.avg_time),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{field} out of range: {value}"));
            }
        }
        if self.avg_accuracy > 100.0 {
            return Err(format!("avg_accuracy above 100: {}", self.avg_accuracy));
        }
        Ok(())
    }
}

/// Model name → averages for one (category, subcategory) pair
pub type SubcategoryResult = BTreeMap<String, MetricSummary>;

/// Model name → homepage URL
pub type ModelLinks = BTreeMap<String, String>;

/// Category → subcategory → per-model results
///
/// Built fresh on every full load; never merged across loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedData {
    categories: BTreeMap<String, BTreeMap<String, SubcategoryResult>>,
}

impl AggregatedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category even if it ends up with no subcategories
    pub fn ensure_category(&mut self, category: &str) {
        self.categories.entry(category.to_string()).or_default();
    }

    /// Insert (or replace) the result for one subcategory
    pub fn insert(&mut self, category: &str, subcategory: &str, result: SubcategoryResult) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(subcategory.to_string(), result);
    }

    pub fn category(&self, category: &str) -> Option<&BTreeMap<String, SubcategoryResult>> {
        self.categories.get(category)
    }

    pub fn subcategory(&self, category: &str, subcategory: &str) -> Option<&SubcategoryResult> {
        self.categories.get(category)?.get(subcategory)
    }

    /// Category names
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Every (category, subcategory, result) triple
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &SubcategoryResult)> {
        self.categories.iter().flat_map(|(category, subs)| {
            subs.iter()
                .map(move |(sub, result)| (category.as_str(), sub.as_str(), result))
        })
    }

    /// Number of loaded subcategories across all categories
    pub fn subcategory_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subcategory_count() == 0
    }
}

/// Image-count-weighted averages for one model across all subcategories
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelAverage {
    pub avg_wer: f64,
    pub avg_cer: f64,
    pub avg_accuracy: f64,
    pub avg_time: f64,
    /// Sum of the `images` field of every contributing record
    #[serde(rename = "totalImages")]
    pub total_images: u64,
    /// Number of subcategories the model appears in
    #[serde(rename = "benchmarkCount")]
    pub benchmark_count: usize,
}

// ============================================================================
// Per-image detail records
// ============================================================================

/// One model's output for one image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageModelResult {
    pub ground_truth: String,
    pub response: String,
    pub wer: f64,
    pub cer: f64,
    pub accuracy: f64,
    pub time: f64,
}

/// Normalised contents of one per-image detail file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// File name without directory and `.json` suffix
    pub filename: String,
    /// Path as listed in the manifest (cache key)
    pub file_path: String,
    pub models: BTreeMap<String, ImageModelResult>,
}

impl ImageResult {
    /// Plain mean of model accuracies (0 when no model survived validation)
    pub fn average_accuracy(&self) -> f64 {
        if self.models.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.models.values().map(|m| m.accuracy).sum();
        sum / self.models.len() as f64
    }

    /// Ground truth taken from the first model (identical for all models)
    pub fn ground_truth(&self) -> Option<&str> {
        self.models.values().next().map(|m| m.ground_truth.as_str())
    }

    /// Models ordered by accuracy, best first
    pub fn models_by_accuracy(&self) -> Vec<(&str, &ImageModelResult)> {
        let mut models: Vec<_> = self
            .models
            .iter()
            .map(|(name, result)| (name.as_str(), result))
            .collect();
        models.sort_by(|a, b| b.1.accuracy.total_cmp(&a.1.accuracy));
        models
    }

    /// File name up to the first `.` (e.g. `00082` for `00082.bin`)
    pub fn image_stem(&self) -> &str {
        self.filename
            .split('.')
            .next()
            .unwrap_or(&self.filename)
    }
}
