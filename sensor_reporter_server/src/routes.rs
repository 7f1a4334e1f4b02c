//! HTTP routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use sensor_reporter_core::{payload, SensorReading};
use tracing::{debug, warn};

use crate::{stream, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/update", post(update))
        .route("/status", get(status))
        .route("/stream", get(stream::stream))
        .with_state(state)
}

/// Stores the posted reading. Any body that is not exactly one numeric
/// `sensor_value` is a 400 and leaves the latest reading untouched.
async fn update(State(state): State<AppState>, body: String) -> StatusCode {
    match payload::decode(&body) {
        Ok(reading) => {
            debug!("Reading received: {}", reading.value());
            state.record(reading).await;
            StatusCode::OK
        }
        Err(e) => {
            warn!("Rejected update {:?}: {}", body, e);
            StatusCode::BAD_REQUEST
        }
    }
}

/// Latest reading, 404 until the first update arrives.
async fn status(State(state): State<AppState>) -> Result<Json<SensorReading>, StatusCode> {
    state.latest().await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerState;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        response::Response,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn post_update(state: &AppState, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/update")
            .header("Content-Type", payload::CONTENT_TYPE)
            .body(Body::from(body.to_string()))
            .unwrap();
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn get_status(state: &AppState) -> Response {
        let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn update_stores_the_latest_reading() {
        let state = Arc::new(ServerState::new());

        let response = post_update(&state, r#"{"sensor_value": 512}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = post_update(&state, r#"{"sensor_value": 513}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(state.latest().await, Some(SensorReading::from(513u16)));
    }

    #[tokio::test]
    async fn malformed_update_is_rejected() {
        let state = Arc::new(ServerState::new());
        state.record(SensorReading::from(7u8)).await;

        for body in [r#"{"sensor_value": "high"}"#, "{}", "512", r#"{"sensor_value": 1, "x": 2}"#] {
            let response = post_update(&state, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        }

        assert_eq!(state.latest().await, Some(SensorReading::from(7u8)));
    }

    #[tokio::test]
    async fn status_before_any_update_is_not_found() {
        let state = Arc::new(ServerState::new());
        assert_eq!(get_status(&state).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_returns_the_latest_reading() {
        let state = Arc::new(ServerState::new());
        post_update(&state, r#"{"sensor_value": 21.5}"#).await;

        let response = get_status(&state).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "sensor_value": 21.5 }));
    }

    #[tokio::test]
    async fn update_is_pushed_to_subscribers() {
        let state = Arc::new(ServerState::new());
        let mut updates = state.subscribe();

        post_update(&state, r#"{"sensor_value": 99}"#).await;

        assert_eq!(updates.try_recv().unwrap(), SensorReading::from(99u8));
    }
}
