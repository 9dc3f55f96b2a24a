/// Errors from credential loading and remote-store calls.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The service-account credential record is missing or malformed.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Signing the token assertion failed.
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service returned a non-2xx status code.
    #[error("Remote API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Reading the local artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
