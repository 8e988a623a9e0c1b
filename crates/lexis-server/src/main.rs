//! lexis-server - REST API server binary.

use std::net::SocketAddr;

use anyhow::Context;
use lexis_core::LexisConfig;
use lexis_server::{create_server, AppState};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn load_config() -> anyhow::Result<LexisConfig> {
    match std::env::var("LEXIS_CONFIG") {
        Ok(path) => LexisConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path)),
        Err(_) => Ok(LexisConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("lexis_server=debug".parse()?),
        )
        .init();

    let host = std::env::var("LEXIS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("LEXIS_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .context("LEXIS_PORT must be a valid port number")?;

    let config = load_config()?;
    info!(database = %config.database_path.display(), "Opening store");
    let state = AppState::from_config(config).context("failed to open store")?;
    info!(algorithm = %state.engine().algorithm(), "Review engine ready");

    let app = create_server(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("invalid listen address")?;
    info!("Starting lexis-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
