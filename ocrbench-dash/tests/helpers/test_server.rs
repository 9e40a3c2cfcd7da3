//! In-process HTTP server for gateway tests
//!
//! Serves a small benchmark data directory under `/data/json/` plus a few
//! misbehaving routes (slow, broken body, header echo).

use axum::extract::RawQuery;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/data/json/manifest.json", get(|| async { Json(manifest()) }))
            .route(
                "/data/json/corpus/Latin/book-a.json",
                get(|| async {
                    Json(json!({
                        "model-a": super::metric(92.0, 8.0, 3.0, 1.5, 10),
                        "model-b": super::metric(88.0, 12.0, 5.0, 0.8, 10)
                    }))
                }),
            )
            .route(
                "/data/json/corpus/Latin/book-b.json",
                get(|| async {
                    Json(json!({
                        "model-a": super::metric(96.0, 4.0, 1.0, 1.0, 30)
                    }))
                }),
            )
            .route(
                "/data/json/model_links.json",
                get(|| async { Json(json!({ "model-a": "https://example.org/model-a" })) }),
            )
            .route(
                "/data/json/slow.json",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Json(json!({}))
                }),
            )
            .route("/data/json/broken.json", get(|| async { "{ not json" }))
            .route(
                "/data/json/echo.json",
                get(|headers: HeaderMap, RawQuery(query): RawQuery| async move {
                    let header = |name: &str| {
                        headers
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    Json(json!({
                        "cache_control": header("cache-control"),
                        "pragma": header("pragma"),
                        "expires": header("expires"),
                        "query": query
                    }))
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/data/json/"),
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn manifest() -> Value {
    json!({
        "generated": "2025-03-01T10:15:30",
        "files": [
            "corpus/Latin/book-a.json",
            "corpus/Latin/book-b.json",
            "corpus/Latin/missing.json"
        ],
        "structure": {
            "Latin": {
                "book-a": { "image_count": 10 },
                "book-b": { "image_count": 30 }
            }
        }
    })
}
