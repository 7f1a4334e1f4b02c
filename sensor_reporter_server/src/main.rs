use std::{net::SocketAddr, sync::Arc};

use sensor_reporter_server::{serve, ServerState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sensor_reporter_server=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr: SocketAddr = std::env::var("SENSOR_SERVER_BIND")
        .unwrap_or_else(|_| DEFAULT_BIND.into())
        .parse()?;
    let listener = TcpListener::bind(bind_addr).await?;

    tracing::info!("Sensor server listening on {}", bind_addr);
    tracing::info!("   POST http://{}/update", bind_addr);
    tracing::info!("   GET  http://{}/status", bind_addr);
    tracing::info!("   WS   ws://{}/stream", bind_addr);

    tokio::select! {
        result = serve(listener, Arc::new(ServerState::new())) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
