//! Football scores gateway
//!
//! Caching, origin-gated proxy in front of a third-party football data API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scores_gateway::gateway::ResponseCache;
use scores_gateway::http::{self, AppState};
use scores_gateway::{provider, AccessGate, CacheStore, Config, Gateway};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env for local runs; real deployments set the environment directly
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scores_gateway=info,tower_http=info")),
        )
        .init();

    info!("Scores gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            return Err(e.into());
        }
    };
    info!("Configuration: {:?}", config);

    let adapter = provider::build_adapter(&config)?;

    let cache: ResponseCache = CacheStore::new();
    if let Some(every) = config.sweep_interval {
        cache.spawn_sweeper(every);
    }

    let gateway = Arc::new(Gateway::new(adapter, cache, config.ttl));
    let gate = AccessGate::new(config.allowed_origins.iter().cloned());
    let app = http::router(AppState::new(gateway), gate);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Proxy running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
