//! Aggregation engine
//!
//! Pure functions over already-loaded data (no I/O):
//! - [`image_count`]: aggregation weight of one subcategory
//! - [`model_averages`]: image-count-weighted averages per model
//! - [`best_scores`]: per-table leaders (exact equality, ties allowed)
//! - [`rank`]: leaderboard ordering by one metric column
//! - [`total_images`]: dataset size shown in the dashboard header
//!
//! Weighting policy: a subcategory with unknown image count has weight 0 and
//! is excluded from both numerator and denominator. A model whose weights
//! sum to 0 gets averages of exactly 0.

use ocrbench_common::{AggregatedData, Error, Manifest, MetricSummary, ModelAverage};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Leaderboard metric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Accuracy,
    Cer,
    Wer,
    Time,
}

impl Metric {
    /// Display order of the leaderboard columns
    pub const ALL: [Metric; 4] = [Metric::Accuracy, Metric::Cer, Metric::Wer, Metric::Time];

    /// Accuracy is the only column where a larger value wins
    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::Accuracy)
    }

    /// Direction applied when a column is first selected
    pub fn default_direction(self) -> SortDirection {
        if self.higher_is_better() {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Cer => "cer",
            Metric::Wer => "wer",
            Metric::Time => "time",
        }
    }

    /// Column header text
    pub fn label(self) -> &'static str {
        match self {
            Metric::Accuracy => "Accuracy (%)",
            Metric::Cer => "CER (%)",
            Metric::Wer => "WER (%)",
            Metric::Time => "Time (s)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accuracy" => Ok(Metric::Accuracy),
            "cer" => Ok(Metric::Cer),
            "wer" => Ok(Metric::Wer),
            "time" => Ok(Metric::Time),
            other => Err(Error::InvalidInput(format!(
                "unknown sort column {other:?} (expected accuracy, cer, wer or time)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(Error::InvalidInput(format!(
                "unknown sort direction {other:?} (expected asc or desc)"
            ))),
        }
    }
}

/// Current ordering of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: Metric,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Descending accuracy
    fn default() -> Self {
        Self {
            column: Metric::Accuracy,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(column: Metric, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Column header click: same column toggles, new column uses its default direction
    pub fn select(self, column: Metric) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                column,
                direction: column.default_direction(),
            }
        }
    }
}

/// A leaderboard row: anything exposing the four metrics
pub trait MetricRow {
    fn metric(&self, metric: Metric) -> f64;
}

impl MetricRow for MetricSummary {
    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.avg_accuracy,
            Metric::Cer => self.avg_cer,
            Metric::Wer => self.avg_wer,
            Metric::Time => self.avg_time,
        }
    }
}

impl MetricRow for ModelAverage {
    fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.avg_accuracy,
            Metric::Cer => self.avg_cer,
            Metric::Wer => self.avg_wer,
            Metric::Time => self.avg_time,
        }
    }
}

/// Best observed value per metric within one table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestScores {
    pub wer: f64,
    pub cer: f64,
    pub accuracy: f64,
    pub time: f64,
}

impl BestScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::Cer => self.cer,
            Metric::Wer => self.wer,
            Metric::Time => self.time,
        }
    }

    /// Exact equality with the extremum
    #[allow(clippy::float_cmp)]
    pub fn is_best(&self, metric: Metric, value: f64) -> bool {
        value == self.get(metric)
    }
}

/// Min WER/CER/time and max accuracy over `rows`; `None` for an empty table
pub fn best_scores<'a, R, I>(rows: I) -> Option<BestScores>
where
    R: MetricRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    rows.into_iter().fold(None, |best, row| {
        let candidate = BestScores {
            wer: row.metric(Metric::Wer),
            cer: row.metric(Metric::Cer),
            accuracy: row.metric(Metric::Accuracy),
            time: row.metric(Metric::Time),
        };
        Some(match best {
            None => candidate,
            Some(b) => BestScores {
                wer: b.wer.min(candidate.wer),
                cer: b.cer.min(candidate.cer),
                accuracy: b.accuracy.max(candidate.accuracy),
                time: b.time.min(candidate.time),
            },
        })
    })
}

/// Order rows by one column; stable, never drops or duplicates entries
pub fn rank<R: MetricRow>(rows: &BTreeMap<String, R>, sort: SortState) -> Vec<(&str, &R)> {
    let mut entries: Vec<(&str, &R)> = rows.iter().map(|(name, row)| (name.as_str(), row)).collect();
    entries.sort_by(|a, b| {
        let ordering = a.1.metric(sort.column).total_cmp(&b.1.metric(sort.column));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    entries
}

/// Aggregation weight of one subcategory
///
/// Declared manifest count when non-zero, else the `images` field of the
/// first model record for that subcategory, else 0.
pub fn image_count(
    manifest: &Manifest,
    aggregated: &AggregatedData,
    category: &str,
    subcategory: &str,
) -> u64 {
    if let Some(declared) = manifest
        .subcategory(category, subcategory)
        .map(|s| s.image_count)
        .filter(|count| *count > 0)
    {
        return declared;
    }

    aggregated
        .subcategory(category, subcategory)
        .and_then(|result| result.values().next())
        .map(|summary| summary.images)
        .unwrap_or(0)
}

#[derive(Default)]
struct WeightedTotals {
    wer: f64,
    cer: f64,
    accuracy: f64,
    time: f64,
    weight: f64,
    total_images: u64,
    benchmark_count: usize,
}

impl WeightedTotals {
    fn mean(&self, sum: f64) -> f64 {
        if self.weight > 0.0 {
            sum / self.weight
        } else {
            0.0
        }
    }
}

/// Weighted averages for every model appearing anywhere in `aggregated`
pub fn model_averages(
    manifest: &Manifest,
    aggregated: &AggregatedData,
) -> BTreeMap<String, ModelAverage> {
    let mut totals: BTreeMap<&str, WeightedTotals> = BTreeMap::new();

    for (category, subcategory, result) in aggregated.iter() {
        let weight = image_count(manifest, aggregated, category, subcategory) as f64;

        for (model, summary) in result {
            let entry = totals.entry(model.as_str()).or_default();
            entry.wer += summary.avg_wer * weight;
            entry.cer += summary.avg_cer * weight;
            entry.accuracy += summary.avg_accuracy * weight;
            entry.time += summary.avg_time * weight;
            entry.weight += weight;
            entry.total_images += summary.images;
            entry.benchmark_count += 1;
        }
    }

    totals
        .into_iter()
        .map(|(model, t)| {
            (
                model.to_string(),
                ModelAverage {
                    avg_wer: t.mean(t.wer),
                    avg_cer: t.mean(t.cer),
                    avg_accuracy: t.mean(t.accuracy),
                    avg_time: t.mean(t.time),
                    total_images: t.total_images,
                    benchmark_count: t.benchmark_count,
                },
            )
        })
        .collect()
}

/// Total dataset size: declared counts, or loaded record counts when none are declared
pub fn total_images(manifest: &Manifest, aggregated: &AggregatedData) -> u64 {
    let declared = manifest.declared_image_total();
    if declared > 0 {
        return declared;
    }

    aggregated
        .iter()
        .filter_map(|(_, _, result)| result.values().next())
        .map(|summary| summary.images)
        .sum()
}
