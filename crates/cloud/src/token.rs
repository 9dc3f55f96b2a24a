//! OAuth2 access tokens for a service account (JWT-bearer grant).
//!
//! A short-lived RS256 assertion is signed with the service account's
//! private key and exchanged at the key's `token_uri` for a bearer token.
//! The bearer token is cached and reused until shortly before it expires.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::error::CloudError;

/// OAuth scope for files created or opened by this app.
pub const SCOPE_DRIVE_FILE: &str = "https://www.googleapis.com/auth/drive.file";

/// OAuth scope for Sheets spreadsheet management.
pub const SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Grant type for the JWT-bearer token exchange.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion (the maximum Google allows).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the cached token this many seconds before it expires.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the signed assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Issues bearer tokens for one service account.
pub struct TokenSource {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    /// Build a token source requesting the Drive file and Sheets scopes.
    ///
    /// Fails if the private key is not a valid RSA PEM, so bad credentials
    /// surface at startup.
    pub fn new(client: reqwest::Client, key: ServiceAccountKey) -> Result<Self, CloudError> {
        Self::with_scopes(client, key, &[SCOPE_DRIVE_FILE, SCOPE_SPREADSHEETS])
    }

    /// Build a token source for an explicit scope list.
    pub fn with_scopes(
        client: reqwest::Client,
        key: ServiceAccountKey,
        scopes: &[&str],
    ) -> Result<Self, CloudError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| CloudError::Credentials(format!("unusable private_key: {e}")))?;

        Ok(Self {
            client,
            key,
            encoding_key,
            scope: scopes.join(" "),
            cached: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, exchanging a fresh assertion if the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, CloudError> {
        // Held across the exchange so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    /// Sign an assertion valid from `now`.
    pub fn assertion(&self, now: i64) -> Result<String, CloudError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, CloudError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

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

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained access token"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
