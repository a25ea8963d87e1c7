//! Chat transport adapter
//!
//! Bridges a frame-oriented socket to a [`Channel`] of decoded messages.
//! Inbound frames are decoded and pushed into the channel in arrival order by
//! a single reader task, which closes the channel exactly once when the
//! socket ends. Outbound messages are serialized and queued for a writer task
//! without waiting for delivery.

mod frame;

pub use frame::Frame;

use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::channel::{Channel, RecvStream};
use crate::error::{ChatError, Result};
use crate::models::{ItemId, ItemSource, Message};

/// One side of a chat conversation over a socket
pub struct Chat {
    channel: Arc<Channel<Message>>,
    source: ItemSource,
    outbound: mpsc::UnboundedSender<Frame>,
    disconnected: watch::Receiver<bool>,
    shutdown: watch::Sender<bool>,
}

impl Chat {
    /// Start the reader and writer tasks for a socket.
    ///
    /// `source` is stamped on every message said through this chat and
    /// `capacity` sizes the inbound channel. Must be called inside a tokio
    /// runtime.
    pub fn new<R, W>(source: ItemSource, capacity: usize, reader: R, writer: W) -> Self
    where
        R: Stream<Item = Result<Frame>> + Send + Unpin + 'static,
        W: Sink<Frame, Error = ChatError> + Send + Unpin + 'static,
    {
        let channel = Arc::new(Channel::with_capacity(capacity));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (disconnected_tx, disconnected) = watch::channel(false);
        let (shutdown, shutdown_rx) = watch::channel(false);

        tokio::spawn(read_frames(
            reader,
            Arc::clone(&channel),
            disconnected_tx,
            shutdown_rx,
        ));
        tokio::spawn(write_frames(outbound_rx, writer));

        Self {
            channel,
            source,
            outbound,
            disconnected,
            shutdown,
        }
    }

    /// Say a plain text message
    pub fn say(&self, text: impl Into<String>) -> Result<()> {
        self.send_message(Message::text(text).with_source(self.source))
    }

    /// Say a plain text message inside a thread
    pub fn say_in_thread(&self, text: impl Into<String>, thread_id: ItemId) -> Result<()> {
        self.send_message(
            Message::text(text)
                .with_source(self.source)
                .in_thread(thread_id),
        )
    }

    /// Queue an arbitrary message for the writer task
    pub fn send_message(&self, message: Message) -> Result<()> {
        let frame = Frame::encode(&message)?;
        self.outbound
            .send(frame)
            .map_err(|_| ChatError::Disconnected)
    }

    /// Ask the writer to close the socket
    pub fn hang_up(&self) -> Result<()> {
        self.outbound
            .send(Frame::Close)
            .map_err(|_| ChatError::Disconnected)
    }

    /// Received messages, in arrival order, until the socket ends
    pub fn messages(&self) -> RecvStream<Message> {
        self.channel.stream()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Wait until the socket has ended and the inbound channel is closed
    pub async fn disconnected(&self) {
        let mut rx = self.disconnected.clone();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Drop for Chat {
    /// Stops the reader even while it waits for a receiver that will never come
    fn drop(&mut self) {
        if self.shutdown.send(true).is_err() {
            debug!("Chat socket reader already stopped");
        }
    }
}

async fn read_frames<R>(
    mut reader: R,
    channel: Arc<Channel<Message>>,
    disconnected: watch::Sender<bool>,
    mut shutdown: watch::Receiver<bool>,
) where
    R: Stream<Item = Result<Frame>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = reader.next() => frame,
            _ = shutdown.changed() => {
                debug!("Chat dropped, stopping socket reader");
                break;
            }
        };

        let frame = match frame {
            Some(Ok(frame)) => frame,
            None => {
                debug!("Chat socket stream ended");
                break;
            }
            Some(Err(e)) => {
                warn!("Chat socket read failed: {}", e);
                break;
            }
        };

        let message = match frame.decode() {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                warn!("Dropping undecodable chat frame: {}", e);
                continue;
            }
            None => {
                debug!("Chat socket received close");
                break;
            }
        };

        tokio::select! {
            sent = channel.send(message) => {
                if let Err(e) = sent {
                    debug!("Inbound chat channel rejected message: {}", e);
                    break;
                }
            }
            _ = shutdown.changed() => {
                debug!("Chat dropped while a message waited for a receiver");
                break;
            }
        }
    }

    if let Err(e) = channel.close() {
        warn!("Inbound chat channel was closed twice: {}", e);
    }
    if disconnected.send(true).is_err() {
        debug!("No one is waiting for the chat disconnect signal");
    }
    info!("Chat socket disconnected");
}

async fn write_frames<W>(mut outbound: mpsc::UnboundedReceiver<Frame>, mut writer: W)
where
    W: Sink<Frame, Error = ChatError> + Unpin,
{
    while let Some(frame) = outbound.recv().await {
        let closing = frame == Frame::Close;
        if let Err(e) = writer.send(frame).await {
            warn!("Chat socket write failed: {}", e);
            return;
        }
        if closing {
            break;
        }
    }

    if let Err(e) = writer.close().await {
        debug!("Chat socket close failed: {}", e);
    }
}
