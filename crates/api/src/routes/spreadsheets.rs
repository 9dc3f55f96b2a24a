use axum::routing::post;
use axum::Router;

use crate::handlers::spreadsheets;
use crate::state::AppState;

/// Routes mounted at `/spreadsheets`.
///
/// ```text
/// POST   /                          -> create_spreadsheet
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(spreadsheets::create_spreadsheet))
}
