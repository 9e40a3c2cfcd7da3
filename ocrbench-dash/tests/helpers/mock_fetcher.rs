//! Scripted JsonFetcher
//!
//! Unknown paths answer HTTP 404. Delayed responses honour the per-call
//! timeout the same way the HTTP gateway does.

use async_trait::async_trait;
use ocrbench_dash::{FetchError, JsonFetcher};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Fail(FetchError),
    Delayed(Duration, Value),
}

#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, path: &str, value: Value) -> Self {
        self.responses.insert(path.to_string(), MockResponse::Json(value));
        self
    }

    pub fn with_failure(mut self, path: &str, error: FetchError) -> Self {
        self.responses.insert(path.to_string(), MockResponse::Fail(error));
        self
    }

    pub fn with_delay(mut self, path: &str, delay: Duration, value: Value) -> Self {
        self.responses
            .insert(path.to_string(), MockResponse::Delayed(delay, value));
        self
    }

    /// Every path requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl JsonFetcher for MockFetcher {
    async fn fetch_json(&self, path: &str, timeout: Duration) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(path.to_string());

        match self.responses.get(path).cloned() {
            None => Err(FetchError::Http {
                status: 404,
                url: path.to_string(),
            }),
            Some(MockResponse::Json(value)) => Ok(value),
            Some(MockResponse::Fail(error)) => Err(error),
            Some(MockResponse::Delayed(delay, value)) => {
                match tokio::time::timeout(timeout, tokio::time::sleep(delay)).await {
                    Ok(()) => Ok(value),
                    Err(_) => Err(FetchError::Timeout {
                        url: path.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                }
            }
        }
    }
}
