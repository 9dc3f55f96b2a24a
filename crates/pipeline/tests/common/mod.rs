//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docpub_cloud::publisher::RemotePublisher;
use docpub_cloud::store::{FileUpload, RemoteStore};
use docpub_cloud::CloudError;
use docpub_core::scripting::interpreter::InterpreterExecutor;
use docpub_pipeline::{Pipeline, PipelineConfig};

/// One call observed by [`FakeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Upload {
        name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
    CreateSpreadsheet(String),
    GrantPublicRead(String),
}

/// In-memory [`RemoteStore`] that records every call.
///
/// Uploaded objects get the id `file-<contents>` so tests can tell which
/// request produced which object.
#[derive(Default)]
pub struct FakeStore {
    calls: Mutex<Vec<StoreCall>>,
    pub fail_uploads: bool,
}

impl FakeStore {
    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Upload { .. }))
            .count()
    }

    /// Whether `remote_id` was made publicly readable.
    pub fn is_public(&self, remote_id: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, StoreCall::GrantPublicRead(id) if id == remote_id))
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn upload(&self, file: FileUpload) -> Result<String, CloudError> {
        let id = format!("file-{}", String::from_utf8_lossy(&file.bytes).trim());
        self.calls.lock().unwrap().push(StoreCall::Upload {
            name: file.name,
            mime_type: file.mime_type,
            bytes: file.bytes,
        });
        if self.fail_uploads {
            return Err(CloudError::ApiError {
                status: 503,
                body: "simulated transport failure".into(),
            });
        }
        Ok(id)
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String, CloudError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::CreateSpreadsheet(title.to_string()));
        Ok(format!("sheet-{}", title.replace(' ', "-")))
    }

    async fn grant_public_read(&self, remote_id: &str) -> Result<(), CloudError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::GrantPublicRead(remote_id.to_string()));
        Ok(())
    }
}

/// Build a pipeline that runs scripts with `sh` under `scratch_root`.
pub fn sh_pipeline(scratch_root: &Path, store: Arc<FakeStore>) -> Pipeline {
    Pipeline::new(
        PipelineConfig {
            scratch_root: scratch_root.to_path_buf(),
            script_extension: "sh".to_string(),
            default_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(20),
        },
        InterpreterExecutor::new("sh"),
        RemotePublisher::new(store),
    )
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

/// Whether any materialized script (`*.sh`) remains under `root`.
pub fn scripts_remaining(root: &Path) -> bool {
    files_under(root)
        .iter()
        .any(|p| p.extension().is_some_and(|e| e == "sh"))
}

/// Whether `pid` names a live (non-zombie) process, per `/proc`.
#[cfg(target_os = "linux")]
pub fn process_alive(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    let state = stat
        .rsplit_once(')')
        .and_then(|(_, rest)| rest.trim_start().chars().next());
    !matches!(state, Some('Z') | Some('X') | None)
}
