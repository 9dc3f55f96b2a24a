//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use docpub_api::config::ServerConfig;
use docpub_api::router::build_app_router;
use docpub_api::state::AppState;
use docpub_cloud::publisher::RemotePublisher;
use docpub_cloud::store::{FileUpload, RemoteStore};
use docpub_cloud::CloudError;
use docpub_pipeline::Pipeline;

/// Build a test `ServerConfig` that runs scripts with `sh` under `scratch_dir`.
pub fn test_config(scratch_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 90,
        scratch_dir: scratch_dir.to_path_buf(),
        script_interpreter: "sh".to_string(),
        script_interpreter_args: vec!["-e".to_string()],
        script_extension: "sh".to_string(),
        script_timeout_secs: 10,
        script_max_timeout_secs: 20,
        drive_folder_id: None,
        log_json: false,
    }
}

/// Build the full application router backed by `store`.
pub fn build_test_app(scratch_dir: &Path, store: Arc<FakeStore>) -> Router {
    build_test_app_with(test_config(scratch_dir), store)
}

/// Like [`build_test_app`], with an explicit configuration.
pub fn build_test_app_with(config: ServerConfig, store: Arc<FakeStore>) -> Router {
    let pipeline = Pipeline::new(
        config.pipeline_config(),
        config.script_executor(),
        RemotePublisher::new(store),
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fake remote store
// ---------------------------------------------------------------------------

/// In-memory [`RemoteStore`]. Uploads get the id `file-<contents>`.
#[derive(Default)]
pub struct FakeStore {
    pub uploads: Mutex<Vec<String>>,
    pub shared: Mutex<Vec<String>>,
    pub spreadsheets: Mutex<Vec<String>>,
    pub fail_uploads: bool,
}

impl FakeStore {
    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn upload(&self, file: FileUpload) -> Result<String, CloudError> {
        self.uploads.lock().unwrap().push(file.name);
        if self.fail_uploads {
            return Err(CloudError::ApiError {
                status: 503,
                body: "backend unavailable".into(),
            });
        }
        Ok(format!("file-{}", String::from_utf8_lossy(&file.bytes).trim()))
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String, CloudError> {
        self.spreadsheets.lock().unwrap().push(title.to_string());
        Ok("sheet-1".to_string())
    }

    async fn grant_public_read(&self, remote_id: &str) -> Result<(), CloudError> {
        self.shared.lock().unwrap().push(remote_id.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Every regular file under `root`, recursively.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}
