use tracing::info;
use tracing_subscriber::EnvFilter;

use weather_gateway::config::GatewayConfig;
use weather_gateway::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        stations_url = %config.stations_url,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        stale_policy = ?config.stale_policy,
        "weather gateway listening"
    );
    info!("endpoints: GET / (web page), GET /nodes (station list), GET /api?lat=..&long=.. (nearest station), GET /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("weather gateway stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
