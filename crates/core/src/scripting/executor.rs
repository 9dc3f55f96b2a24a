//! Unified script execution interface and shared types.
//!
//! Defines [`ScriptExecutor`], the trait that runtime executors implement,
//! along with [`ScriptInput`], [`ScriptOutput`], and [`ScriptError`].
//!
//! A non-zero exit code is *not* an error at this layer: the executor
//! reports what happened and the caller decides what it means.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Input passed to a script executor.
#[derive(Debug, Clone)]
pub struct ScriptInput {
    /// Additional environment variables set for the child process.
    pub env_vars: Vec<(String, String)>,
    /// Working directory for the child process (uses current dir if `None`).
    pub working_directory: Option<PathBuf>,
    /// Maximum wall-clock time before the process is killed.
    pub timeout: Duration,
}

/// Captured output from a script execution.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    /// Complete stdout captured from the process.
    pub stdout: String,
    /// Complete stderr captured from the process.
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScriptOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors that keep a script from producing a [`ScriptOutput`].
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Script not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Killed after running past [`ScriptInput::timeout`].
    #[error("Script timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// Spawning the interpreter or collecting its output failed.
    #[error("I/O error: {0}")]
    IoError(#[source] std::io::Error),
}

/// Runs a script file to completion.
///
/// Implementations own the choice of runtime; callers only see the
/// captured output or why none was produced.
pub trait ScriptExecutor: Send + Sync {
    fn execute(
        &self,
        script_path: &Path,
        input: ScriptInput,
    ) -> impl std::future::Future<Output = Result<ScriptOutput, ScriptError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
