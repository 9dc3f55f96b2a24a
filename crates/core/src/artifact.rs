//! Artifact kinds, naming rules, and post-execution lookup.
//!
//! A script is expected to leave exactly one file behind at a path derived
//! from the request directory, the artifact base name, and the kind's
//! extension. [`locate`] is the only check performed: existence of a regular
//! file at that exact path. Contents are never inspected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Base name used when the caller does not supply one.
pub const DEFAULT_ARTIFACT_NAME: &str = "output";

/// Longest accepted artifact base name, in bytes.
pub const MAX_ARTIFACT_NAME_LEN: usize = 200;

const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The kind of document a submitted script is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Document,
    Spreadsheet,
    #[serde(alias = "presentation")]
    Slideshow,
}

impl ArtifactKind {
    /// File extension (without the dot) the script must use.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Document => "docx",
            Self::Spreadsheet => "xlsx",
            Self::Slideshow => "pptx",
        }
    }

    /// MIME type sent to the remote store on upload.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Document => MIME_DOCX,
            Self::Spreadsheet => MIME_XLSX,
            Self::Slideshow => MIME_PPTX,
        }
    }

    /// Wire name, as accepted in request bodies.
    pub fn name(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Spreadsheet => "spreadsheet",
            Self::Slideshow => "slideshow",
        }
    }

    /// File name `<base>.<ext>` for this kind.
    pub fn file_name(self, base_name: &str) -> String {
        format!("{base_name}.{}", self.extension())
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// A file produced by a script, confirmed present on local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub local_path: PathBuf,
    pub mime_type: &'static str,
    pub display_name: String,
    pub kind: ArtifactKind,
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

/// Validate a caller-supplied artifact base name.
///
/// The name becomes a file name inside the request directory, so anything
/// that could escape it (separators, `..`, leading dots) is rejected.
pub fn validate_artifact_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "artifact_name must not be empty".into(),
        ));
    }
    if name.len() > MAX_ARTIFACT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "artifact_name must be at most {MAX_ARTIFACT_NAME_LEN} bytes"
        )));
    }
    if name.starts_with('.') {
        return Err(CoreError::Validation(
            "artifact_name must not start with '.'".into(),
        ));
    }
    if name.contains(['/', '\\', '\0']) || name.contains("..") {
        return Err(CoreError::Validation(format!(
            "artifact_name '{name}' contains a path separator or '..'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Check that `expected_path` holds a regular file and describe it.
///
/// Returns [`CoreError::ArtifactNotFound`] when nothing (or a directory) is
/// at that path.
pub async fn locate(expected_path: &Path, kind: ArtifactKind) -> Result<Artifact, CoreError> {
    let is_file = match tokio::fs::metadata(expected_path).await {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(CoreError::Io(e)),
    };

    if !is_file {
        return Err(CoreError::ArtifactNotFound {
            path: expected_path.to_path_buf(),
        });
    }

    let display_name = expected_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| kind.file_name(DEFAULT_ARTIFACT_NAME));

    Ok(Artifact {
        local_path: expected_path.to_path_buf(),
        mime_type: kind.mime_type(),
        display_name,
        kind,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
