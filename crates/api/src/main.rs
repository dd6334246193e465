use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fluxdeck_api::config::ServerConfig;
use fluxdeck_api::{router, state};
use fluxdeck_fal::FalQueueClient;
use fluxdeck_media::{GalleryStore, HttpFetcher, MediaPersister};

use state::AppState;

/// URL prefix the persisted-media directory is served under.
const MEDIA_PREFIX: &str = "/saved_images";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fluxdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let api_key = std::env::var("FAL_KEY").expect("FAL_KEY must be set");

    // --- Directories ---
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");
    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .expect("Failed to create media directory");

    // --- External service client ---
    let service = Arc::new(FalQueueClient::new(
        config.fal_queue_url.clone(),
        config.fal_rest_url.clone(),
        api_key,
    ));

    // --- Media persistence & gallery ---
    let persister = Arc::new(MediaPersister::new(
        config.media_dir.clone(),
        MEDIA_PREFIX.to_string(),
        Arc::new(HttpFetcher::default()),
    ));
    let gallery = Arc::new(GalleryStore::new(
        config.media_dir.clone(),
        MEDIA_PREFIX.to_string(),
    ));

    // --- App state & router ---
    let state = AppState {
        config: Arc::new(config.clone()),
        service,
        persister,
        gallery,
    };
    let app = router::build_app_router(state, &config);

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
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
