use axum::routing::post;
use axum::Router;

use crate::handlers::artifacts;
use crate::state::AppState;

/// Routes mounted at `/artifacts`.
///
/// ```text
/// POST   /                          -> publish_artifact
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(artifacts::publish_artifact))
}
