//! `Stream` view over a channel

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream};

use super::{Channel, RecvFuture};

/// Pulls values from a [`Channel`] one `recv` at a time.
///
/// Ends after the first `None` and never yields again, even if the stream is
/// polled further.
pub struct RecvStream<T> {
    channel: Arc<Channel<T>>,
    pending: Option<RecvFuture<T>>,
    done: bool,
}

impl<T> RecvStream<T> {
    pub fn new(channel: Arc<Channel<T>>) -> Self {
        Self {
            channel,
            pending: None,
            done: false,
        }
    }

    /// The channel this stream reads from
    pub fn channel(&self) -> &Arc<Channel<T>> {
        &self.channel
    }
}

impl<T> Stream for RecvStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if self.done {
            return Poll::Ready(None);
        }

        let this = &mut *self;
        let pending = this
            .pending
            .get_or_insert_with(|| this.channel.recv());

        match Pin::new(pending).poll(cx) {
            Poll::Ready(item) => {
                this.pending = None;
                if item.is_none() {
                    this.done = true;
                }
                Poll::Ready(item)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> FusedStream for RecvStream<T> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_yields_until_closed() {
        let channel = Arc::new(Channel::new());

        let producer = Arc::clone(&channel);
        tokio::spawn(async move {
            for word in ["one", "two", "three"] {
                producer.send(word).await.unwrap();
            }
            producer.close().unwrap();
        });

        let words: Vec<_> = channel.stream().collect().await;
        assert_eq!(words, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_stream_is_not_restartable() {
        let channel = Arc::new(Channel::with_capacity(1));
        channel.send(1).await.unwrap();
        channel.close().unwrap();

        let mut stream = channel.stream();
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, None);
        assert!(stream.is_terminated());
        assert_eq!(stream.next().await, None);
    }
}
