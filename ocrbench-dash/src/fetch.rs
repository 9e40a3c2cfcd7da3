//! Fetch gateway
//!
//! The only I/O primitive of the dashboard. Every manifest, result and
//! per-image file goes through [`JsonFetcher::fetch_json`].
//!
//! [`HttpFetcher`] behaviour:
//! - Relative paths are resolved against the data base URL
//! - A `_t=<unix millis>` query parameter plus no-cache headers make every
//!   request reach the origin instead of an intermediate cache
//! - Each call has its own timeout; when it elapses the transfer future is
//!   dropped, aborting the request and discarding any partial body
//! - A shared [`CancellationToken`] aborts every in-flight fetch at once

use crate::error::FetchError;
use async_trait::async_trait;
use ocrbench_common::config::normalize_base_url;
use reqwest::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ocrbench/", env!("CARGO_PKG_VERSION"));

/// Source of JSON documents addressed by data-root-relative path
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch and parse one JSON document within `timeout`
    async fn fetch_json(&self, path: &str, timeout: Duration) -> Result<Value, FetchError>;
}

/// HTTP implementation of [`JsonFetcher`]
pub struct HttpFetcher {
    http_client: reqwest::Client,
    base_url: Url,
    cancel_token: CancellationToken,
}

impl HttpFetcher {
    /// Create a fetcher rooted at `base_url`; a missing trailing `/` is added
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let normalized = normalize_base_url(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        let base_url = Url::parse(&normalized)
            .map_err(|e| FetchError::InvalidUrl(format!("{normalized}: {e}")))?;

        // No client-wide timeout: every call carries its own budget
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            base_url,
            cancel_token: CancellationToken::new(),
        })
    }

    /// Share an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a data-root-relative path to an absolute URL
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn transfer(&self, url: Url, url_text: String) -> Result<Value, FetchError> {
        let response = self
            .http_client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
            .header(PRAGMA, "no-cache")
            .header(EXPIRES, "0")
            .send()
            .await
            .map_err(|e| network_error(&url_text, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url_text,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(&url_text, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse {
            url: url_text,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, path: &str, timeout: Duration) -> Result<Value, FetchError> {
        let url = self.resolve(path)?;
        let url_text = url.to_string();
        let request_url = cache_busted(&url, chrono::Utc::now().timestamp_millis());

        debug!(url = %url_text, timeout_ms = timeout.as_millis() as u64, "Fetching JSON");

        tokio::select! {
            biased;

            _ = self.cancel_token.cancelled() => {
                debug!(url = %url_text, "Fetch cancelled");
                Err(FetchError::Cancelled { url: url_text.clone() })
            }
            outcome = tokio::time::timeout(timeout, self.transfer(request_url, url_text.clone())) => {
                match outcome {
                    Ok(result) => result,
                    Err(_elapsed) => {
                        warn!(url = %url_text, timeout_ms = timeout.as_millis() as u64, "Fetch timed out");
                        Err(FetchError::Timeout {
                            url: url_text.clone(),
                            timeout_ms: timeout.as_millis() as u64,
                        })
                    }
                }
            }
        }
    }
}

/// Append the cache-defeating `_t` parameter (`?` or `&` as needed)
pub fn cache_busted(url: &Url, stamp_ms: i64) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut()
        .append_pair("_t", &stamp_ms.to_string());
    url
}

fn network_error(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}
