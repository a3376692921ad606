//! Gemini proxy server - Main entry point
//!
//! Loads configuration from the environment, then serves the forwarding
//! handler until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use gemini_openai_proxy::{
    build_router,
    core::{init_tracing, AppConfig},
    AppState,
};
use std::sync::Arc;

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        upstream = %config.upstream_base_url,
        environment = %config.environment,
        verify_ssl = config.verify_ssl,
        request_timeout_secs = ?config.request_timeout_secs,
        "Configuration loaded"
    );

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = Arc::new(AppState::from_config(config).context("Failed to build HTTP client")?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("Starting Gemini proxy on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
