//! HTTP and WebSocket surface
//!
//! Serves the echo bot over WebSocket plus a health check.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::ChatServer;
