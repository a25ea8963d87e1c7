//! WebSocket handlers

pub mod echo;
