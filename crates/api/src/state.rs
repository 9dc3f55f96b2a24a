use std::sync::Arc;

use docpub_pipeline::Pipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable. Everything behind the `Arc`s is built once in `main`
/// and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The execute-then-publish pipeline, including the remote client.
    pub pipeline: Arc<Pipeline>,
}
