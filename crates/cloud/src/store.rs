//! The remote-store seam.
//!
//! A [`RemoteStore`] can create objects (from bytes, or as an empty
//! spreadsheet) and grant anonymous read access to them. Everything else
//! about publishing lives in [`crate::publisher`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CloudError;

/// Which service a remote object lives in; decides the link template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// A file uploaded to the document store.
    DriveFile,
    /// A native spreadsheet created through the spreadsheet service.
    Spreadsheet,
}

impl LinkKind {
    /// Deterministic shareable URL for `remote_id`.
    pub fn shareable_link(self, remote_id: &str) -> String {
        match self {
            Self::DriveFile => {
                format!("https://drive.google.com/file/d/{remote_id}/view?usp=sharing")
            }
            Self::Spreadsheet => {
                format!("https://docs.google.com/spreadsheets/d/{remote_id}/edit?usp=sharing")
            }
        }
    }
}

/// A file to create in the remote store.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Operations the publisher needs from a remote object store.
///
/// Implementations must be safe to share across concurrent requests; the
/// store is built once at startup and only read afterwards.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create an object from bytes and return its remote id.
    async fn upload(&self, file: FileUpload) -> Result<String, CloudError>;

    /// Create an empty spreadsheet titled `title` and return its remote id.
    async fn create_spreadsheet(&self, title: &str) -> Result<String, CloudError>;

    /// Let anyone holding the link read the object.
    async fn grant_public_read(&self, remote_id: &str) -> Result<(), CloudError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
