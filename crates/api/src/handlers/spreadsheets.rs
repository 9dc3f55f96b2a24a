use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use docpub_cloud::publisher::PublishedArtifact;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for spreadsheet creation.
#[derive(Debug, Deserialize)]
pub struct CreateSpreadsheetRequest {
    /// Title of the new spreadsheet.
    pub sheet_name: String,
}

/// POST /api/v1/spreadsheets
pub async fn create_spreadsheet(
    State(state): State<AppState>,
    body: Result<Json<CreateSpreadsheetRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedArtifact>>)> {
    let Json(input) = body?;
    let published = state.pipeline.create_spreadsheet(&input.sheet_name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: published })))
}
