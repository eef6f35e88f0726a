//! DocRead Server
//!
//! Extracts text from base64-encoded PDFs (text layer) and images (OCR),
//! optionally restricted to a page selection.

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docread_server::config::Config;
use docread_server::routes;
use docread_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "docread_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Starting DocRead Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "OCR provider: {:?}, languages: {}",
        config.ocr.provider,
        config.ocr.languages.join("+")
    );

    let temp_dir = config.extract.temp_dir();
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed to create staging directory {}", temp_dir.display()))?;
    tracing::info!("Staging documents in {}", temp_dir.display());

    // The OCR engine is created once here and shared by all requests
    let app_state = AppState::new(config.clone());
    app_state.ocr().probe().await;

    let app = routes::app(app_state);

    let addr = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?;
    tracing::info!("DocRead Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
