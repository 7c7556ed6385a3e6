use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use segcull_api::config::ServerConfig;
use segcull_api::router::build_app_router;
use segcull_api::state::AppState;
use segcull_core::deletion::{DeletionRecord, TagPolicy};
use segcull_core::types::{FrameIndex, LabelId, PixelBounds};
use segcull_resolver::{LabelResolver, OverlayImage, ResolverError};
use segcull_store::SequenceStore;

/// A throwaway base directory for sequences, removed on drop.
pub struct TestEnv {
    pub base_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let base_dir = std::env::temp_dir().join(format!("segcull-api-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&base_dir).expect("create test base dir");
        Self { base_dir }
    }

    /// Create a sequence directory with one PNG frame per `(width, height)`
    /// entry, named so sorted order matches the slice order.
    pub fn write_sequence(&self, name: &str, frames: &[(u32, u32)]) {
        let dir = self.base_dir.join(name);
        std::fs::create_dir_all(&dir).expect("create sequence dir");
        for (i, &(width, height)) in frames.iter().enumerate() {
            let img = image::RgbImage::new(width, height);
            img.save(dir.join(format!("{i:03}.png"))).expect("write frame");
        }
    }

    pub fn sequence_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.base_dir);
    }
}

/// Scripted stand-in for the segmentation service.
///
/// Returns the same label list for every region query and a fixed PNG body
/// for every overlay request, recording the arguments it was called with.
pub struct StubResolver {
    labels: Vec<LabelId>,
    pub label_calls: Mutex<Vec<(String, FrameIndex, PixelBounds)>>,
    pub overlay_calls: Mutex<Vec<(String, FrameIndex, Vec<DeletionRecord>)>>,
}

impl StubResolver {
    pub fn returning(labels: Vec<LabelId>) -> Arc<Self> {
        Arc::new(Self {
            labels,
            label_calls: Mutex::new(Vec::new()),
            overlay_calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LabelResolver for StubResolver {
    async fn resolve_labels(
        &self,
        sequence: &str,
        frame: FrameIndex,
        bounds: PixelBounds,
    ) -> Result<Vec<LabelId>, ResolverError> {
        self.label_calls
            .lock()
            .unwrap()
            .push((sequence.to_string(), frame, bounds));
        Ok(self.labels.clone())
    }

    async fn fetch_overlay(
        &self,
        sequence: &str,
        frame: FrameIndex,
        records: &[DeletionRecord],
    ) -> Result<OverlayImage, ResolverError> {
        self.overlay_calls
            .lock()
            .unwrap()
            .push((sequence.to_string(), frame, records.to_vec()));
        Ok(OverlayImage {
            bytes: b"\x89PNG-stub".to_vec(),
            content_type: "image/png".to_string(),
        })
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(base_dir: &Path, policy: TagPolicy) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        base_dir: base_dir.to_path_buf(),
        resolver_url: "http://127.0.0.1:8890".to_string(),
        tag_name: "bloom-time".to_string(),
        policy,
    }
}

/// Build the full application router with all middleware layers.
///
/// This goes through `build_app_router` so integration tests exercise the
/// same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(env: &TestEnv, policy: TagPolicy, resolver: Arc<StubResolver>) -> Router {
    let config = test_config(&env.base_dir, policy);
    let store = Arc::new(SequenceStore::new(
        config.base_dir.clone(),
        config.tag_name.clone(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        resolver,
        sessions: Arc::new(RwLock::new(Default::default())),
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app and return the raw response.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body and return the raw response.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes()
        .to_vec()
}
