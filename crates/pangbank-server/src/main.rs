//! PanGBank REST API Server
//!
//! This binary opens the catalog database and serves the PanGBank API,
//! streaming pangenome files and mash sketches from the data directory.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use pangbank_server::{AppState, ServerConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command line arguments
    let config = ServerConfig::parse();

    // Open database (migrations are applied on connect)
    info!("Opening database {}", config.database_path.display());
    let pool = pangbank_db::connect(&config.db_config())
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    if !config.data_dir.is_dir() {
        warn!(
            "Data directory {} does not exist; file downloads will fail",
            config.data_dir.display()
        );
    }

    let app_state = AppState::new(pool.clone(), &config.data_dir);
    let app = create_router(app_state, &config);

    // Bind to address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Starting PanGBank API server on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
