//! Chatline - ordered async hand-off channel and chat transport
//!
//! ## Features
//!
//! - `Channel<T>`: FIFO hand-off queue with optional buffering, rendezvous
//!   semantics at capacity zero, and a one-way close that releases every
//!   waiting receiver
//! - `Chat`: adapter feeding decoded socket frames into a channel and saying
//!   messages back over the socket
//! - Echo bot server over WebSocket

pub mod api;
pub mod channel;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;

pub use channel::{Channel, RecvStream};
pub use chat::{Chat, Frame};
pub use config::Config;
pub use error::{ChannelError, ChatError, Result};
