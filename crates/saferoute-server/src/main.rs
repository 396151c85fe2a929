//! SafeRoute server: route search with lighting, weather and profile ranking.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saferoute_server::api;
use saferoute_server::config::Config;
use saferoute_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("saferoute_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting SafeRoute server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        "directions={} overpass={} weather={}",
        config.directions_url,
        config.overpass_url,
        config.weather_url
    );

    let state = AppState::from_config(config).context("failed to build HTTP client")?;
    let app = api::app(Arc::new(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
