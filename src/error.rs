use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures reported by [`Channel`](crate::channel::Channel) operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// A send after close, or a queued send that lost its race against a close
    #[error("send on closed channel")]
    SendOnClosed,

    #[error("channel already closed")]
    ChannelAlreadyClosed,
}

/// Unified error type for the chat transport and server
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    // Wire errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Connection closed")]
    Disconnected,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ChatError::Json(_) | ChatError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 409 Conflict
            ChatError::Channel(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            ChatError::WebSocket(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            ChatError::Disconnected => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            ChatError::Io(_) | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<axum::Error> for ChatError {
    fn from(err: axum::Error) -> Self {
        ChatError::WebSocket(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_messages() {
        assert_eq!(
            ChannelError::SendOnClosed.to_string(),
            "send on closed channel"
        );
        assert_eq!(
            ChannelError::ChannelAlreadyClosed.to_string(),
            "channel already closed"
        );
        assert_eq!(
            ChatError::from(ChannelError::SendOnClosed).to_string(),
            "send on closed channel"
        );
    }

    #[test]
    fn test_error_status_code_mapping() {
        assert_eq!(
            ChatError::InvalidConfig("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::Channel(ChannelError::ChannelAlreadyClosed).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ChatError::WebSocket("reset".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ChatError::Disconnected.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_client_server_helpers() {
        assert!(ChatError::InvalidConfig("bad".to_string()).is_client_error());
        assert!(!ChatError::InvalidConfig("bad".to_string()).is_server_error());

        assert!(ChatError::Disconnected.is_server_error());
        assert!(!ChatError::Disconnected.is_client_error());
    }
}
