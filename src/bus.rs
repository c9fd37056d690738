//! Application-wide event bus.
//!
//! Injected into reactors that merge external events through
//! `transform_action` / `transform_mutation`. The bus is a plain value
//! handed to the reactor; there is no global instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::stream::{Observable, PublishSubject};

/// Cloneable handle to a shared hot stream of `E`.
///
/// Subscribers see only events published after they subscribed.
pub struct EventBus<E> {
    subject: PublishSubject<E>,
    closed: Arc<AtomicBool>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subject: PublishSubject::new(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver `event` to every current subscriber. Ignored after [`close`](Self::close).
    pub fn publish(&self, event: E) {
        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!(
                bus = std::any::type_name::<E>(),
                "publish on closed event bus ignored"
            );
            return;
        }
        tracing::trace!(
            bus = std::any::type_name::<E>(),
            subscribers = self.subject.observer_count(),
            "event published"
        );
        self.subject.on_next(event);
    }

    pub fn events(&self) -> Observable<E> {
        self.subject.observable()
    }

    /// Complete every subscriber's stream.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.subject.on_completed();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subject.observer_count()
    }
}
