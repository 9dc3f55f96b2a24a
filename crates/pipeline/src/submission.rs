//! The inbound unit of work.

use std::time::Duration;

use docpub_core::artifact::{validate_artifact_name, ArtifactKind, DEFAULT_ARTIFACT_NAME};
use docpub_core::scratch::LineSeparator;
use serde::Deserialize;

use crate::error::PipelineError;

/// A script to run and the artifact it is expected to produce.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSubmission {
    /// Raw script text.
    pub code: String,
    /// Kind of document the script writes.
    pub artifact_kind: ArtifactKind,
    /// Base name (without extension) of the expected artifact.
    #[serde(default)]
    pub artifact_name: Option<String>,
    /// Substitution applied to literal `\n` sequences before writing.
    #[serde(default)]
    pub line_separator: LineSeparator,
    /// Requested timeout; clamped to the configured maximum.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ScriptSubmission {
    pub fn new(code: impl Into<String>, artifact_kind: ArtifactKind) -> Self {
        Self {
            code: code.into(),
            artifact_kind,
            artifact_name: None,
            line_separator: LineSeparator::default(),
            timeout_secs: None,
        }
    }

    pub fn with_artifact_name(mut self, name: impl Into<String>) -> Self {
        self.artifact_name = Some(name.into());
        self
    }

    pub fn with_line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// The artifact base name, falling back to [`DEFAULT_ARTIFACT_NAME`].
    pub fn artifact_base_name(&self) -> &str {
        self.artifact_name.as_deref().unwrap_or(DEFAULT_ARTIFACT_NAME)
    }

    /// Reject submissions that cannot run before touching the filesystem.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.code.trim().is_empty() {
            return Err(PipelineError::InvalidSubmission(
                "code must not be empty".into(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(PipelineError::InvalidSubmission(
                "timeout_secs must be positive".into(),
            ));
        }
        if let Some(name) = &self.artifact_name {
            validate_artifact_name(name)?;
        }
        Ok(())
    }

    /// Effective timeout: the requested one or `default`, never above `max`.
    pub fn effective_timeout(&self, default: Duration, max: Duration) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default)
            .min(max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
