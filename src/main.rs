//! ws-relay server entry point.
//!
//! Starts the Axum server with the WebSocket relay and system endpoints.

use tracing_subscriber::EnvFilter;

use ws_relay::app_state::AppState;
use ws_relay::config::RelayConfig;
use ws_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting ws-relay");

    let app = server::build_app(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "websocket relay listening");

    server::serve(listener, app).await?;

    Ok(())
}
