//! Ordered hand-off channel
//!
//! A FIFO queue between senders and receivers with an optional fixed buffer.
//! With a capacity of zero every send is a rendezvous with a receive.
//!
//! Operations take effect when they are *called*: `send` and `recv` update the
//! channel state immediately and return a future that only observes the
//! outcome. Issuing `send(a)` and `send(b)` without awaiting therefore queues
//! them in call order.
//!
//! All four pieces of state (buffer, pending sends, pending receives, closed
//! flag) live behind one mutex which is never held across an `.await`. Each
//! suspended operation owns a `oneshot` completion, so it is resolved at most
//! once.

mod stream;

pub use stream::RecvStream;

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::ChannelError;

type SendCompletion = oneshot::Sender<Result<(), ChannelError>>;

struct PendingSend<T> {
    value: T,
    completion: SendCompletion,
}

struct State<T> {
    capacity: usize,
    buffer: VecDeque<T>,
    pending_sends: VecDeque<PendingSend<T>>,
    /// Receivers are resolved by sending a value; dropping the sender resolves
    /// them as done.
    pending_recvs: VecDeque<oneshot::Sender<T>>,
    closed: bool,
}

/// A typed FIFO hand-off queue with optional buffering and one-way close
pub struct Channel<T> {
    state: Mutex<State<T>>,
}

impl<T> Channel<T> {
    /// Create an unbuffered channel
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a channel that buffers up to `capacity` values without a
    /// waiting receiver
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                capacity,
                buffer: VecDeque::new(),
                pending_sends: VecDeque::new(),
                pending_recvs: VecDeque::new(),
                closed: false,
            }),
        }
    }

    /// Send a value.
    ///
    /// Hands the value to the earliest waiting receiver, or buffers it if
    /// there is room. Otherwise the send is queued and the returned future
    /// completes once a receiver takes the value.
    ///
    /// Fails with [`ChannelError::SendOnClosed`] if the channel is closed, or
    /// if it gets closed while this send is still queued and a later `recv`
    /// reaches it.
    pub fn send(&self, value: T) -> SendFuture {
        let mut state = self.state.lock();

        if state.closed {
            return SendFuture::ready(Err(ChannelError::SendOnClosed));
        }

        let mut value = value;
        while let Some(waiter) = state.pending_recvs.pop_front() {
            match waiter.send(value) {
                Ok(()) => return SendFuture::ready(Ok(())),
                // Receiver future was dropped; try the next one.
                Err(returned) => value = returned,
            }
        }

        if state.buffer.len() < state.capacity {
            state.buffer.push_back(value);
            return SendFuture::ready(Ok(()));
        }

        let (completion, rx) = oneshot::channel();
        state.pending_sends.push_back(PendingSend { value, completion });
        trace!(queued = state.pending_sends.len(), "send waiting for receiver");
        SendFuture::waiting(rx)
    }

    /// Receive the next value.
    ///
    /// Resolves to `None` once the channel is closed and every buffered value
    /// has been delivered.
    pub fn recv(&self) -> RecvFuture<T> {
        let mut state = self.state.lock();

        if let Some(value) = state.buffer.pop_front() {
            // Keep the buffer full while senders are queued behind it.
            if !state.closed {
                if let Some(pending) = state.pending_sends.pop_front() {
                    state.buffer.push_back(pending.value);
                    let _ = pending.completion.send(Ok(()));
                }
            }
            return RecvFuture::ready(Some(value));
        }

        if let Some(pending) = state.pending_sends.pop_front() {
            if state.closed {
                let _ = pending.completion.send(Err(ChannelError::SendOnClosed));
                return RecvFuture::ready(None);
            }

            let _ = pending.completion.send(Ok(()));
            return RecvFuture::ready(Some(pending.value));
        }

        if state.closed {
            return RecvFuture::ready(None);
        }

        // Forget receivers whose futures were dropped before a value arrived.
        state.pending_recvs.retain(|waiter| !waiter.is_closed());

        let (waiter, rx) = oneshot::channel();
        state.pending_recvs.push_back(waiter);
        trace!(waiting = state.pending_recvs.len(), "recv waiting for value");
        RecvFuture::waiting(rx)
    }

    /// Close the channel.
    ///
    /// Every waiting receiver resolves to `None` in the order it started
    /// waiting. Queued sends are left in place; the next `recv` that reaches
    /// one fails it with [`ChannelError::SendOnClosed`].
    pub fn close(&self) -> Result<(), ChannelError> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(ChannelError::ChannelAlreadyClosed);
        }

        state.closed = true;
        let waiters = std::mem::take(&mut state.pending_recvs);
        debug!(
            receivers = waiters.len(),
            buffered = state.buffer.len(),
            queued_sends = state.pending_sends.len(),
            "channel closed"
        );

        for waiter in waiters {
            drop(waiter);
        }

        Ok(())
    }

    /// A stream yielding received values until the channel is done
    pub fn stream(self: &Arc<Self>) -> RecvStream<T> {
        RecvStream::new(Arc::clone(self))
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    /// Number of values sitting in the buffer
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("capacity", &state.capacity)
            .field("buffered", &state.buffer.len())
            .field("pending_sends", &state.pending_sends.len())
            .field("pending_recvs", &state.pending_recvs.len())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Completion of a [`Channel::send`]
#[must_use = "the value is already queued; await the future to observe delivery"]
#[derive(Debug)]
pub struct SendFuture {
    inner: SendInner,
}

#[derive(Debug)]
enum SendInner {
    Ready(Result<(), ChannelError>),
    Waiting(oneshot::Receiver<Result<(), ChannelError>>),
}

impl SendFuture {
    fn ready(result: Result<(), ChannelError>) -> Self {
        Self {
            inner: SendInner::Ready(result),
        }
    }

    fn waiting(rx: oneshot::Receiver<Result<(), ChannelError>>) -> Self {
        Self {
            inner: SendInner::Waiting(rx),
        }
    }
}

impl Future for SendFuture {
    type Output = Result<(), ChannelError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            SendInner::Ready(result) => Poll::Ready(*result),
            // A dropped completion means the channel itself went away.
            SendInner::Waiting(rx) => Pin::new(rx)
                .poll(cx)
                .map(|res| res.unwrap_or(Err(ChannelError::SendOnClosed))),
        }
    }
}

/// Completion of a [`Channel::recv`]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct RecvFuture<T> {
    inner: RecvInner<T>,
}

enum RecvInner<T> {
    Ready(Option<T>),
    Waiting(oneshot::Receiver<T>),
}

impl<T> RecvFuture<T> {
    fn ready(value: Option<T>) -> Self {
        Self {
            inner: RecvInner::Ready(value),
        }
    }

    fn waiting(rx: oneshot::Receiver<T>) -> Self {
        Self {
            inner: RecvInner::Waiting(rx),
        }
    }
}

impl<T> Unpin for RecvFuture<T> {}

impl<T> Future for RecvFuture<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            RecvInner::Ready(value) => Poll::Ready(value.take()),
            RecvInner::Waiting(rx) => Pin::new(rx).poll(cx).map(Result::ok),
        }
    }
}

impl<T> fmt::Debug for RecvFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.inner {
            RecvInner::Ready(Some(_)) => "ready",
            RecvInner::Ready(None) => "done",
            RecvInner::Waiting(_) => "waiting",
        };
        f.debug_struct("RecvFuture").field("state", &state).finish()
    }
}
