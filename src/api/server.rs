//! Chat server using Axum
//!
//! Hosts the echo bot WebSocket endpoint and a health check.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use dashmap::DashMap;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::{ChatConfig, Config, ServerConfig};
use crate::error::{ChatError, Result};

use super::routes;

/// Identifier handed to each WebSocket connection
pub type ConnectionId = u64;

/// Live WebSocket connections keyed by id
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Instant>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection under a fresh random id
    pub fn register(&self) -> ConnectionId {
        loop {
            let id = rand::random::<ConnectionId>();
            if let dashmap::mapref::entry::Entry::Vacant(entry) = self.connections.entry(id) {
                entry.insert(Instant::now());
                return id;
            }
        }
    }

    pub fn remove(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatConfig,
    pub started_at: Instant,
    pub connections: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(chat: ChatConfig) -> Self {
        Self {
            chat,
            started_at: Instant::now(),
            connections: Arc::new(ConnectionRegistry::new()),
        }
    }
}

/// Chat server
pub struct ChatServer {
    config: ServerConfig,
    state: AppState,
}

impl ChatServer {
    /// Create a new chat server
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.server.clone(),
            state: AppState::new(config.chat.clone()),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Run the chat server until `shutdown` flips
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| ChatError::InvalidConfig(format!("Invalid server address: {}", e)))?;

        let router = self.build_router();

        info!("Chat server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        info!("Chat server shut down");
        Ok(())
    }
}
