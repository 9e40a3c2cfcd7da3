//! Dashboard session
//!
//! [`DashboardContext`] is the immutable result of one successful full load.
//! [`Dashboard`] owns the loaders, the current context and the view history,
//! and resolves a [`View`] into what should be displayed.

use crate::aggregate;
use crate::detail::{DetailBatch, IndividualFileLoader};
use crate::error::{EntryRejection, FileFailure, LoadError};
use crate::fetch::JsonFetcher;
use crate::manifest::ManifestLoader;
use crate::view::{Navigator, View};
use ocrbench_common::config::DashboardSettings;
use ocrbench_common::{AggregatedData, Manifest, ModelAverage, ModelLinks};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything the dashboard view needs, from one full load
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub manifest: Manifest,
    pub aggregated: AggregatedData,
    pub model_links: ModelLinks,
    pub failures: Vec<FileFailure>,
    pub rejected: Vec<EntryRejection>,
}

impl DashboardContext {
    /// Manifest, then all result files, then model links
    pub async fn load(loader: &ManifestLoader) -> Result<Self, LoadError> {
        let manifest = loader.load_manifest().await?;
        let report = loader.load_all(&manifest).await?;
        let model_links = loader.load_model_links().await;

        Ok(Self {
            manifest,
            aggregated: report.aggregated,
            model_links,
            failures: report.failures,
            rejected: report.rejected,
        })
    }

    pub fn image_count(&self, category: &str, subcategory: &str) -> u64 {
        aggregate::image_count(&self.manifest, &self.aggregated, category, subcategory)
    }

    pub fn model_averages(&self) -> BTreeMap<String, ModelAverage> {
        aggregate::model_averages(&self.manifest, &self.aggregated)
    }

    pub fn total_images(&self) -> u64 {
        aggregate::total_images(&self.manifest, &self.aggregated)
    }

    pub fn model_link(&self, model: &str) -> Option<&str> {
        self.model_links.get(model).map(String::as_str)
    }

    /// Categories to display: declared order first, then undeclared ones
    pub fn category_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = self
            .manifest
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        for name in self.aggregated.category_names() {
            if !order.contains(&name) {
                order.push(name);
            }
        }
        order
    }

    /// Loaded subcategories of one category, declared order first
    pub fn subcategory_order(&self, category: &str) -> Vec<&str> {
        let Some(loaded) = self.aggregated.category(category) else {
            return Vec::new();
        };

        let mut order: Vec<&str> = self
            .manifest
            .category(category)
            .map(|c| {
                c.subcategories
                    .iter()
                    .map(|s| s.name.as_str())
                    .filter(|name| loaded.contains_key(*name))
                    .collect()
            })
            .unwrap_or_default();
        for name in loaded.keys() {
            if !order.contains(&name.as_str()) {
                order.push(name.as_str());
            }
        }
        order
    }
}

/// Detail view content for one subcategory
#[derive(Debug, Clone)]
pub struct DetailScreen {
    pub category: String,
    pub subcategory: String,
    pub batch: DetailBatch,
}

/// What a resolved view displays
#[derive(Debug, Clone)]
pub enum Screen {
    Dashboard,
    Details(DetailScreen),
}

/// Loaders, current data and navigation state of one session
pub struct Dashboard {
    loader: ManifestLoader,
    details: IndividualFileLoader,
    navigator: Navigator,
    context: Option<DashboardContext>,
}

impl Dashboard {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, settings: &DashboardSettings) -> Self {
        Self {
            loader: ManifestLoader::new(Arc::clone(&fetcher), settings),
            details: IndividualFileLoader::new(fetcher, settings.timeout),
            navigator: Navigator::default(),
            context: None,
        }
    }

    /// Full load from scratch; on failure the previous data is discarded
    pub async fn reload(&mut self) -> Result<&DashboardContext, LoadError> {
        self.context = None;
        let context = DashboardContext::load(&self.loader).await?;
        info!(
            subcategories = context.aggregated.subcategory_count(),
            models = context.model_averages().len(),
            "Dashboard data ready"
        );
        Ok(self.context.insert(context))
    }

    pub fn context(&self) -> Option<&DashboardContext> {
        self.context.as_ref()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn detail_loader(&self) -> &IndividualFileLoader {
        &self.details
    }

    /// Navigate to `view` and resolve it
    pub async fn open(&mut self, view: View) -> Result<Screen, LoadError> {
        self.navigator.navigate_to(view);
        self.show_current().await
    }

    pub async fn back(&mut self) -> Option<Result<Screen, LoadError>> {
        self.navigator.back()?;
        Some(self.show_current().await)
    }

    pub async fn forward(&mut self) -> Option<Result<Screen, LoadError>> {
        self.navigator.forward()?;
        Some(self.show_current().await)
    }

    /// Resolve the current view against the loaded data
    pub async fn show_current(&self) -> Result<Screen, LoadError> {
        let context = self.context.as_ref().ok_or(LoadError::NotLoaded)?;

        match self.navigator.current() {
            View::Dashboard => Ok(Screen::Dashboard),
            View::Details {
                category,
                subcategory,
            } => {
                let batch = self
                    .details
                    .load_subcategory(&context.manifest, category, subcategory)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "Detail view unavailable");
                        e
                    })?;

                Ok(Screen::Details(DetailScreen {
                    category: category.clone(),
                    subcategory: subcategory.clone(),
                    batch,
                }))
            }
        }
    }
}
