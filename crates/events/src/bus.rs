//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is a pub/sub mechanism for handing events to whoever listens:
//!
//! - **Transport-agnostic**: in-memory channels here; a UI host may bridge to
//!   its own message dispatch.
//! - **Broadcast**: each subscriber gets its own copy of every message
//!   published after it subscribed.
//! - **No persistence**: a message published with no subscribers is dropped.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// ## Usage Pattern
///
/// ```ignore
/// let bus: Arc<InMemoryEventBus<CartNotification>> = ...;
/// let subscription = bus.subscribe();
///
/// while let Ok(notification) = subscription.try_recv() {
///     render(notification);
/// }
/// ```
///
/// Subscriptions are meant for single-threaded consumption. Messages arrive
/// in the order they were published.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail (e.g. the transport is gone). Failures are surfaced
/// to the caller, which decides whether the action that produced the message
/// should fail too.
///
/// The trait requires `Send + Sync` so one bus can be shared between the
/// publisher and the UI host.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
