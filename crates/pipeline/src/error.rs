use std::path::PathBuf;

use docpub_cloud::CloudError;
use docpub_core::error::CoreError;
use docpub_core::scripting::executor::ScriptError;

/// Every way a submission can fail, one variant per pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The submission was rejected before anything was written.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// Writing the script, spawning the process, or reading the artifact failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The script exited with a non-zero code.
    #[error("Script failed with exit code {exit_code}: {stderr}")]
    ScriptExecution {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The script ran past its timeout and was killed.
    #[error("Script timed out after {elapsed_ms}ms")]
    ScriptTimeout { elapsed_ms: u64 },

    /// The script exited 0 but left no file at the expected path.
    #[error("Expected artifact not found at {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// An upload, permission, or spreadsheet-creation call failed.
    #[error("Remote service failure: {0}")]
    RemoteService(#[source] CloudError),
}

impl PipelineError {
    /// Machine-readable category, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSubmission(_) => "INVALID_SUBMISSION",
            Self::Io(_) => "IO_FAILURE",
            Self::ScriptExecution { .. } => "SCRIPT_EXECUTION_FAILURE",
            Self::ScriptTimeout { .. } => "SCRIPT_TIMEOUT",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::RemoteService(_) => "REMOTE_SERVICE_FAILURE",
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::InvalidSubmission(msg),
            CoreError::ArtifactNotFound { path } => Self::ArtifactNotFound { path },
            CoreError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ScriptError> for PipelineError {
    fn from(err: ScriptError) -> Self {
        match err {
            ScriptError::NotFound(path) => Self::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("materialized script missing: {}", path.display()),
            )),
            ScriptError::Timeout { elapsed_ms } => Self::ScriptTimeout { elapsed_ms },
            ScriptError::IoError(e) => Self::Io(e),
        }
    }
}

impl From<CloudError> for PipelineError {
    fn from(err: CloudError) -> Self {
        match err {
            // Reading the local artifact is not a remote failure.
            CloudError::Io(e) => Self::Io(e),
            other => Self::RemoteService(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
