//! Health check endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "chatline",
            "connections": state.connections.len(),
            "uptime_secs": state.started_at.elapsed().as_secs(),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatConfig;
    use axum::response::Response;

    #[tokio::test]
    async fn test_health_reports_connection_count() {
        let state = AppState::new(ChatConfig {
            buffer: 0,
            greeting: "Online".to_string(),
        });
        state.connections.register();

        let response: Response = health_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["connections"], 1);
    }
}
