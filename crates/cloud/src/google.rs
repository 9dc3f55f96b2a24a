//! [`RemoteStore`] backed by Google Drive v3 and Sheets v4.
//!
//! All calls authenticate with a bearer token from [`TokenSource`]. Endpoint
//! bases are configurable so tests can point the client at a local server.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::credentials::ServiceAccountKey;
use crate::error::CloudError;
use crate::store::{FileUpload, RemoteStore};
use crate::token::TokenSource;

/// Base URLs of the Google APIs used by [`GoogleWorkspaceStore`].
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    /// Drive metadata API, e.g. `https://www.googleapis.com`.
    pub api_base: String,
    /// Drive media upload API, e.g. `https://www.googleapis.com/upload`.
    pub upload_base: String,
    /// Sheets API, e.g. `https://sheets.googleapis.com`.
    pub sheets_base: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com".to_string(),
            upload_base: "https://www.googleapis.com/upload".to_string(),
            sheets_base: "https://sheets.googleapis.com".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// All three bases rooted at one URL (used against mock servers).
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: base.to_string(),
            upload_base: format!("{base}/upload"),
            sheets_base: base.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

/// Google Drive / Sheets client for one service account.
pub struct GoogleWorkspaceStore {
    client: reqwest::Client,
    tokens: TokenSource,
    endpoints: GoogleEndpoints,
    folder_id: Option<String>,
}

impl GoogleWorkspaceStore {
    /// Build a store from a service-account key.
    ///
    /// Fails if the key cannot be used for signing.
    pub fn new(
        client: reqwest::Client,
        key: ServiceAccountKey,
        endpoints: GoogleEndpoints,
    ) -> Result<Self, CloudError> {
        let tokens = TokenSource::new(client.clone(), key)?;
        Ok(Self {
            client,
            tokens,
            endpoints,
            folder_id: None,
        })
    }

    /// Place uploaded files in the given Drive folder.
    pub fn with_folder(mut self, folder_id: Option<String>) -> Self {
        self.folder_id = folder_id;
        self
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`CloudError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CloudError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CloudError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CloudError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteStore for GoogleWorkspaceStore {
    async fn upload(&self, file: FileUpload) -> Result<String, CloudError> {
        let token = self.tokens.access_token().await?;

        let mut metadata = json!({
            "name": file.name,
            "mimeType": file.mime_type,
        });
        if let Some(folder) = &self.folder_id {
            metadata["parents"] = json!([folder]);
        }

        let boundary = format!("docpub-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &metadata, &file.mime_type, &file.bytes);

        let response = self
            .client
            .post(format!(
                "{}/drive/v3/files?uploadType=multipart&fields=id",
                self.endpoints.upload_base
            ))
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let created: CreatedFile = Self::parse_response(response).await?;
        Ok(created.id)
    }

    async fn create_spreadsheet(&self, title: &str) -> Result<String, CloudError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(format!("{}/v4/spreadsheets", self.endpoints.sheets_base))
            .bearer_auth(token)
            .json(&json!({ "properties": { "title": title } }))
            .send()
            .await?;

        let created: CreatedSpreadsheet = Self::parse_response(response).await?;
        Ok(created.spreadsheet_id)
    }

    async fn grant_public_read(&self, remote_id: &str) -> Result<(), CloudError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(format!(
                "{}/drive/v3/files/{remote_id}/permissions",
                self.endpoints.api_base
            ))
            .bearer_auth(token)
            .json(&json!({ "type": "anyone", "role": "reader" }))
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Build a two-part `multipart/related` body: JSON metadata, then media.
pub fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    media_type: &str,
    media: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
