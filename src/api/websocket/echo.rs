//! Echo bot WebSocket handler
//!
//! Greets every client, then replies to each message with a copy of itself.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{future, SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::api::server::AppState;
use crate::chat::{Chat, Frame};
use crate::error::ChatError;
use crate::models::ItemSource;

/// WebSocket handler for the echo bot
pub async fn echo_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_echo_ws(socket, state))
}

/// Handle WebSocket connection for the echo bot
async fn handle_echo_ws(socket: WebSocket, state: AppState) {
    let connection = state.connections.register();
    info!(connection, "Echo WebSocket connected");

    let (sink, stream) = socket.split();

    let reader = stream.filter_map(|msg| {
        future::ready(match msg {
            Ok(msg) => frame_from_ws(msg).map(Ok),
            Err(e) => Some(Err(ChatError::from(e))),
        })
    });
    let writer = sink.with(|frame: Frame| future::ready(Ok::<_, ChatError>(frame_to_ws(frame))));

    let chat = Chat::new(ItemSource::Bot, state.chat.buffer, reader, writer);
    run_echo(&chat, &state.chat.greeting).await;

    state.connections.remove(connection);
    info!(connection, "Echo WebSocket disconnected");
}

/// Say `greeting`, then echo every received message until the chat ends
pub async fn run_echo(chat: &Chat, greeting: &str) {
    if let Err(e) = chat.say(greeting) {
        warn!("Failed to greet client: {}", e);
        return;
    }

    let mut messages = chat.messages();
    while let Some(message) = messages.next().await {
        debug!("echo: got {:?}", message.text);
        if let Err(e) = chat.send_message(message.reply()) {
            warn!("Failed to echo message: {}", e);
            break;
        }
    }
}

/// Map a WebSocket message to a chat frame; control frames are dropped
fn frame_from_ws(msg: WsMessage) -> Option<Frame> {
    match msg {
        WsMessage::Text(text) => Some(Frame::Text(text)),
        WsMessage::Binary(bytes) => Some(Frame::Binary(bytes)),
        WsMessage::Close(_) => Some(Frame::Close),
        // Pong is handled automatically by axum
        WsMessage::Ping(_) | WsMessage::Pong(_) => None,
    }
}

fn frame_to_ws(frame: Frame) -> WsMessage {
    match frame {
        Frame::Text(text) => WsMessage::Text(text),
        Frame::Binary(bytes) => WsMessage::Binary(bytes),
        Frame::Close => WsMessage::Close(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::Message;
    use futures::channel::mpsc;

    #[test]
    fn test_ws_frame_mapping() {
        assert_eq!(
            frame_from_ws(WsMessage::Text("hi".to_string())),
            Some(Frame::Text("hi".to_string()))
        );
        assert_eq!(
            frame_from_ws(WsMessage::Binary(vec![1, 2])),
            Some(Frame::Binary(vec![1, 2]))
        );
        assert_eq!(frame_from_ws(WsMessage::Close(None)), Some(Frame::Close));
        assert_eq!(frame_from_ws(WsMessage::Ping(vec![])), None);

        assert!(matches!(
            frame_to_ws(Frame::Text("x".to_string())),
            WsMessage::Text(t) if t == "x"
        ));
        assert!(matches!(frame_to_ws(Frame::Close), WsMessage::Close(None)));
    }

    #[tokio::test]
    async fn test_echo_greets_then_replies_in_order() {
        let (inbound_tx, inbound_rx) = mpsc::unbounded::<Result<Frame>>();
        let (outbound_tx, outbound_rx) = mpsc::unbounded::<Frame>();
        let writer = outbound_tx.sink_map_err(|e| ChatError::WebSocket(e.to_string()));
        let chat = Chat::new(ItemSource::Bot, 0, inbound_rx, writer);

        let first = Message {
            id: Some(1),
            ..Message::user("one")
        };
        let second = Message {
            id: Some(2),
            ..Message::user("two").in_thread(1)
        };
        inbound_tx
            .unbounded_send(Frame::encode(&first))
            .unwrap();
        inbound_tx
            .unbounded_send(Frame::encode(&second))
            .unwrap();
        inbound_tx.unbounded_send(Ok(Frame::Close)).unwrap();

        run_echo(&chat, "Online").await;
        drop(chat);

        let said: Vec<Message> = outbound_rx
            .filter_map(|frame| future::ready(frame.decode().and_then(|m| m.ok())))
            .collect()
            .await;

        assert_eq!(said.len(), 3);
        assert_eq!(said[0], Message::bot("Online"));
        assert_eq!(said[1], first.reply());
        assert_eq!(said[2], second.reply());
        assert_eq!(said[2].reply_id, Some(2));
        assert_eq!(said[2].thread_id, Some(1));
    }
}
