//! WebSocket push of incoming readings.
//!
//! A client first gets the latest reading, if there is one, then every
//! reading recorded after it connected. Frames carry the same body the
//! reporter posts.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use sensor_reporter_core::{payload, SensorReading};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::AppState;

pub(crate) async fn stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| push_readings(socket, state))
}

async fn push_readings(mut socket: WebSocket, state: AppState) {
    info!("Client connected");

    // Subscribe before looking at the latest reading so nothing recorded in
    // between is missed.
    let mut updates = state.subscribe();
    if let Some(reading) = state.latest().await {
        if send_reading(&mut socket, &reading).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(reading) => {
                    if send_reading(&mut socket, &reading).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Stream client lagging, skipped {} readings", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Client disconnected");
}

async fn send_reading(socket: &mut WebSocket, reading: &SensorReading) -> Result<(), axum::Error> {
    match payload::encode(reading) {
        Ok(body) => socket.send(Message::Text(body)).await,
        Err(e) => {
            warn!("Could not encode reading for stream: {}", e);
            Ok(())
        }
    }
}
