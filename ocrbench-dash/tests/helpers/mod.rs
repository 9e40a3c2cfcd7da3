//! Test helpers for ocrbench-dash integration tests
//!
//! - MockFetcher: scripted in-memory JsonFetcher that records every call
//! - TestServer: axum server on an ephemeral port for the HTTP gateway
//! - Fixture builders for manifests and result files

#![allow(dead_code)]

pub mod mock_fetcher;
pub mod test_server;

pub use mock_fetcher::{MockFetcher, MockResponse};
pub use test_server::TestServer;

use ocrbench_common::config::DashboardSettings;
use serde_json::{json, Value};
use std::time::Duration;

/// Settings with a short timeout and default file names
pub fn test_settings(timeout_ms: u64) -> DashboardSettings {
    DashboardSettings {
        timeout: Duration::from_millis(timeout_ms),
        ..DashboardSettings::default()
    }
}

/// One model record of a subcategory result file
pub fn metric(accuracy: f64, wer: f64, cer: f64, time: f64, images: u64) -> Value {
    json!({
        "avg_wer": wer,
        "avg_cer": cer,
        "avg_accuracy": accuracy,
        "avg_time": time,
        "images": images
    })
}

/// One model record of a per-image file
pub fn image_entry(gt: &str, response: &str, accuracy: f64) -> Value {
    json!({
        "gt": gt,
        "response": response,
        "wer": 100.0 - accuracy,
        "cer": (100.0 - accuracy) / 2.0,
        "accuracy": accuracy,
        "time": 0.75
    })
}
