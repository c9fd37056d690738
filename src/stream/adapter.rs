//! Bridge from push-based observables to pull-based async streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::error::StreamError;
use super::event::Event;
use super::observable::Observable;
use super::subscription::Subscription;

/// Async view of an observable subscription.
///
/// Yields `Ok(value)` per value, `Err` once for a terminal error, then
/// `None`. Dropping the stream cancels the subscription.
pub struct EventStream<T> {
    rx: mpsc::UnboundedReceiver<Result<T, StreamError>>,
    subscription: Subscription,
}

impl<T> EventStream<T> {
    pub async fn next(&mut self) -> Option<Result<T, StreamError>> {
        self.rx.recv().await
    }

    /// Non-blocking poll for an already delivered item.
    pub fn try_next(&mut self) -> Option<Result<T, StreamError>> {
        self.rx.try_recv().ok()
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> Stream for EventStream<T> {
    type Item = Result<T, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Subscribe and expose the events as a [`futures_core::Stream`].
    pub fn into_stream(&self) -> EventStream<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Dropping the sender on a terminal event ends the receiving side.
        let tx = Mutex::new(Some(tx));
        let subscription = self.subscribe(move |event| {
            let mut guard = tx.lock();
            let Some(sender) = guard.as_ref() else {
                return;
            };
            match event {
                Event::Next(value) => {
                    let _ = sender.send(Ok(value));
                }
                Event::Error(err) => {
                    let _ = sender.send(Err(err));
                    guard.take();
                }
                Event::Completed => {
                    guard.take();
                }
            }
        });
        EventStream { rx, subscription }
    }
}
