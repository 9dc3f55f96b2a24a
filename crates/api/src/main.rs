use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docpub_api::config::ServerConfig;
use docpub_api::router::build_app_router;
use docpub_api::state::AppState;
use docpub_cloud::credentials::ServiceAccountKey;
use docpub_cloud::google::{GoogleEndpoints, GoogleWorkspaceStore};
use docpub_cloud::publisher::RemotePublisher;
use docpub_pipeline::Pipeline;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docpub_api=debug,docpub_pipeline=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let ceiling = config.script_timeout_ceiling_secs();
    if ceiling < config.script_max_timeout_secs.max(config.script_timeout_secs) {
        tracing::warn!(
            script_max_timeout_secs = config.script_max_timeout_secs,
            request_timeout_secs = config.request_timeout_secs,
            effective_max_secs = ceiling,
            "Script timeout lowered to fit inside the request timeout"
        );
    }

    // --- Remote store ---
    let key = ServiceAccountKey::from_env().expect("Failed to load service account credentials");
    tracing::info!(client_email = %key.client_email, "Loaded service account credentials");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .expect("Failed to build HTTP client");

    let store = GoogleWorkspaceStore::new(http, key, GoogleEndpoints::default())
        .expect("Service account key cannot sign requests")
        .with_folder(config.drive_folder_id.clone());

    // --- Scratch root ---
    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .expect("Failed to create scratch directory");
    tracing::info!(scratch_dir = %config.scratch_dir.display(), "Scratch directory ready");

    // --- Pipeline ---
    let pipeline = Pipeline::new(
        config.pipeline_config(),
        config.script_executor(),
        RemotePublisher::new(Arc::new(store)),
    );
    tracing::info!(
        interpreter = %config.script_interpreter,
        default_timeout_secs = config.script_timeout_secs,
        "Pipeline ready"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). In-flight
/// submissions run to completion before the server exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
