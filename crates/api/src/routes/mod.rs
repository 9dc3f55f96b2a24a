pub mod artifacts;
pub mod health;
pub mod spreadsheets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /artifacts          run a script and publish its artifact (POST)
/// /spreadsheets       create an empty shared spreadsheet (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/artifacts", artifacts::router())
        .nest("/spreadsheets", spreadsheets::router())
}
