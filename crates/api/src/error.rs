use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docpub_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for pipeline failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failure from one of the pipeline stages.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A request body that could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details = None;

        let (status, code, message) = match &self {
            // --- Pipeline failures ---
            AppError::Pipeline(err) => {
                let code = err.code();
                match err {
                    PipelineError::InvalidSubmission(msg) => {
                        (StatusCode::BAD_REQUEST, code, msg.clone())
                    }
                    PipelineError::Io(io) => {
                        tracing::error!(error = %io, "Pipeline I/O failure");
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            code,
                            "A local I/O error occurred".to_string(),
                        )
                    }
                    PipelineError::ScriptExecution {
                        exit_code,
                        stdout,
                        stderr,
                    } => {
                        details = Some(json!({
                            "exit_code": exit_code,
                            "stdout": stdout,
                            "stderr": stderr,
                        }));
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            code,
                            format!("Script exited with code {exit_code}"),
                        )
                    }
                    PipelineError::ScriptTimeout { elapsed_ms } => {
                        details = Some(json!({ "elapsed_ms": elapsed_ms }));
                        (StatusCode::GATEWAY_TIMEOUT, code, err.to_string())
                    }
                    PipelineError::ArtifactNotFound { path } => {
                        let file = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            code,
                            format!("Script did not produce the expected artifact '{file}'"),
                        )
                    }
                    PipelineError::RemoteService(cloud) => {
                        tracing::error!(error = %cloud, "Remote service failure");
                        (StatusCode::BAD_GATEWAY, code, err.to_string())
                    }
                }
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

