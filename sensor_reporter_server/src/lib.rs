//! # sensor_reporter_server
//!
//! Receiving end of the sensor reporter.
//!
//! - `POST /update` takes a `{"sensor_value": N}` body and stores it as the latest reading
//! - `GET /status` returns the latest reading
//! - `GET /stream` is a WebSocket that pushes every reading as it arrives
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sensor_reporter_server::{serve, ServerState};
//!
//! let listener = TcpListener::bind("0.0.0.0:5000").await?;
//! serve(listener, Arc::new(ServerState::new())).await?;
//! ```

pub mod routes;
pub mod stream;

pub use routes::create_router;

use std::sync::Arc;

use sensor_reporter_core::SensorReading;
use tokio::{
    net::TcpListener,
    sync::{broadcast, RwLock},
};

/// Readings a slow stream client may fall behind before it starts skipping.
const UPDATE_BUFFER: usize = 32;

/// Latest reading plus the fan-out to stream clients.
pub struct ServerState {
    latest: RwLock<Option<SensorReading>>,
    updates: broadcast::Sender<SensorReading>,
}

impl ServerState {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            latest: RwLock::new(None),
            updates,
        }
    }

    /// Replaces the latest reading and pushes it to every stream client.
    pub async fn record(&self, reading: SensorReading) {
        *self.latest.write().await = Some(reading.clone());
        // No stream clients is fine
        let _ = self.updates.send(reading);
    }

    pub async fn latest(&self) -> Option<SensorReading> {
        self.latest.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SensorReading> {
        self.updates.subscribe()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for shared state in Axum handlers.
pub type AppState = Arc<ServerState>;

/// Serves the router on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
