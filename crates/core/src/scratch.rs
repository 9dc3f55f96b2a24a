//! Per-request scratch directories.
//!
//! Each submission gets its own directory `<root>/<uuid>/`. The submitted
//! code is materialized there as `<uuid>.<ext>`, the script runs with that
//! directory as its working directory, and the expected artifact path lives
//! there too. Two in-flight requests therefore never share a path.
//!
//! [`RequestScratch`] owns the directory for the lifetime of the request and
//! guarantees the materialized script is removed on every exit path:
//!
//! - [`RequestScratch::remove_all`] after a confirmed publish removes the
//!   directory and everything in it.
//! - [`RequestScratch::cleanup`] after a failure removes only the script and
//!   leaves any artifact behind for diagnostics.
//! - If neither is called (early return, panic, cancelled future) the
//!   `Drop` impl performs the `cleanup` equivalent synchronously.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::artifact::ArtifactKind;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Line separator substitution
// ---------------------------------------------------------------------------

/// The literal two-character escape sequence some clients send instead of a
/// real line break.
const ESCAPED_NEWLINE: &str = "\\n";

/// How to treat literal `\n` escape sequences in submitted code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    /// Write the code exactly as received.
    #[default]
    Verbatim,
    /// Replace each literal `\n` with a line feed.
    Newline,
    /// Replace each literal `\n` with `; `.
    Semicolon,
}

impl LineSeparator {
    /// Apply the substitution to `code`.
    pub fn apply<'a>(self, code: &'a str) -> Cow<'a, str> {
        let replacement = match self {
            Self::Verbatim => return Cow::Borrowed(code),
            Self::Newline => "\n",
            Self::Semicolon => "; ",
        };
        if code.contains(ESCAPED_NEWLINE) {
            Cow::Owned(code.replace(ESCAPED_NEWLINE, replacement))
        } else {
            Cow::Borrowed(code)
        }
    }
}

// ---------------------------------------------------------------------------
// MaterializedScript
// ---------------------------------------------------------------------------

/// A submitted script written to disk.
#[derive(Debug, Clone)]
pub struct MaterializedScript {
    pub path: PathBuf,
    /// The exact text written (after separator substitution).
    pub content: String,
}

// ---------------------------------------------------------------------------
// RequestScratch
// ---------------------------------------------------------------------------

/// A uniquely named working directory owned by one request.
#[derive(Debug)]
pub struct RequestScratch {
    id: Uuid,
    dir: PathBuf,
    script_path: Option<PathBuf>,
    finalized: bool,
}

impl RequestScratch {
    /// Create a fresh directory under `root`, keyed by a new UUID.
    pub async fn create(root: &Path) -> Result<Self, CoreError> {
        let id = Uuid::new_v4();
        let dir = root.join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(request_id = %id, dir = %dir.display(), "Created request scratch directory");

        Ok(Self {
            id,
            dir,
            script_path: None,
            finalized: false,
        })
    }

    /// The request's unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The request's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the script is expected to leave its artifact.
    pub fn artifact_path(&self, base_name: &str, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name(base_name))
    }

    /// Write `code` to `<dir>/<uuid>.<extension>`.
    ///
    /// May only be called once per request.
    pub async fn materialize(
        &mut self,
        code: &str,
        extension: &str,
        separator: LineSeparator,
    ) -> Result<MaterializedScript, CoreError> {
        if self.script_path.is_some() {
            return Err(CoreError::Validation(
                "script already materialized for this request".into(),
            ));
        }

        let path = self.dir.join(format!("{}.{extension}", self.id));
        let content = separator.apply(code).into_owned();

        // Record the path before writing so a partial write is still cleaned up.
        self.script_path = Some(path.clone());
        tokio::fs::write(&path, content.as_bytes()).await?;

        Ok(MaterializedScript { path, content })
    }

    /// Remove the script and, if nothing else is left, the directory.
    ///
    /// Any artifact the script produced is retained.
    pub async fn cleanup(mut self) {
        self.finalized = true;
        if let Some(script) = self.script_path.take() {
            remove_file_logged(&script).await;
        }
        // Fails with "directory not empty" when an artifact is present.
        if tokio::fs::remove_dir(&self.dir).await.is_ok() {
            tracing::debug!(request_id = %self.id, "Removed empty request directory");
        } else {
            tracing::debug!(
                request_id = %self.id,
                dir = %self.dir.display(),
                "Request directory retained"
            );
        }
    }

    /// Remove the whole directory, script and artifact included.
    pub async fn remove_all(mut self) {
        self.finalized = true;
        self.script_path = None;
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    request_id = %self.id,
                    dir = %self.dir.display(),
                    error = %e,
                    "Failed to remove request directory"
                );
            }
        }
    }
}

impl Drop for RequestScratch {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        if let Some(script) = self.script_path.take() {
            match std::fs::remove_file(&script) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %script.display(),
                    error = %e,
                    "Failed to remove materialized script"
                ),
            }
        }
        let _ = std::fs::remove_dir(&self.dir);
    }
}

async fn remove_file_logged(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed materialized script"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove materialized script"
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
