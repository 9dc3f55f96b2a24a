//! Handler for script submissions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use docpub_cloud::publisher::PublishedArtifact;
use docpub_pipeline::ScriptSubmission;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/artifacts
///
/// Run the submitted script, then upload and share the artifact it wrote.
/// Responds only after the whole pipeline has finished.
pub async fn publish_artifact(
    State(state): State<AppState>,
    body: Result<Json<ScriptSubmission>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedArtifact>>)> {
    let Json(submission) = body?;
    let published = state.pipeline.run(&submission).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: published })))
}
