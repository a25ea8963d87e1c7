//! Transport frames carried by the chat adapter

use crate::error::Result;
use crate::models::Message;

/// One unit read from or written to the underlying socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// The peer is going away; no frames follow
    Close,
}

impl Frame {
    /// Encode a message as a JSON text frame
    pub fn encode(message: &Message) -> Result<Self> {
        Ok(Frame::Text(serde_json::to_string(message)?))
    }

    /// Decode the JSON payload of a data frame.
    ///
    /// Returns `None` for `Close`.
    pub fn decode(&self) -> Option<Result<Message>> {
        match self {
            Frame::Text(text) => Some(serde_json::from_str(text).map_err(Into::into)),
            Frame::Binary(bytes) => Some(serde_json::from_slice(bytes).map_err(Into::into)),
            Frame::Close => None,
        }
    }
}
