//! Publishing: create a remote object, make it public, build its link.
//!
//! Both entry points share the same tail: once an object exists it gets a
//! public-read permission and a link derived from its id and [`LinkKind`].
//! A failure at any step is returned as-is. An object that was created but
//! could not be made public stays in the store.

use std::sync::Arc;

use docpub_core::artifact::Artifact;
use serde::Serialize;

use crate::error::CloudError;
use crate::store::{FileUpload, LinkKind, RemoteStore};

/// A published object and the link that grants anonymous read access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArtifact {
    pub remote_id: String,
    pub shareable_link: String,
    pub kind: LinkKind,
}

/// Publishes artifacts and creates spreadsheets through a [`RemoteStore`].
///
/// Cheap to clone; the store is shared behind an `Arc`.
#[derive(Clone)]
pub struct RemotePublisher {
    store: Arc<dyn RemoteStore>,
}

impl RemotePublisher {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Upload a local artifact and share it.
    pub async fn publish(&self, artifact: &Artifact) -> Result<PublishedArtifact, CloudError> {
        let bytes = tokio::fs::read(&artifact.local_path).await?;
        let size = bytes.len();

        let remote_id = self
            .store
            .upload(FileUpload {
                name: artifact.display_name.clone(),
                mime_type: artifact.mime_type.to_string(),
                bytes,
            })
            .await?;
        tracing::info!(
            remote_id = %remote_id,
            name = %artifact.display_name,
            size,
            "Uploaded artifact"
        );

        self.share(remote_id, LinkKind::DriveFile).await
    }

    /// Create an empty remote spreadsheet and share it.
    pub async fn create_spreadsheet(
        &self,
        sheet_name: &str,
    ) -> Result<PublishedArtifact, CloudError> {
        let remote_id = self.store.create_spreadsheet(sheet_name).await?;
        tracing::info!(remote_id = %remote_id, sheet_name, "Created spreadsheet");

        self.share(remote_id, LinkKind::Spreadsheet).await
    }

    async fn share(
        &self,
        remote_id: String,
        kind: LinkKind,
    ) -> Result<PublishedArtifact, CloudError> {
        self.store.grant_public_read(&remote_id).await?;
        let shareable_link = kind.shareable_link(&remote_id);
        tracing::debug!(remote_id = %remote_id, link = %shareable_link, "Granted public read");

        Ok(PublishedArtifact {
            remote_id,
            shareable_link,
            kind,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
