//! Push-based observable core: `Observable`, `Sink` and the constructors.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::StreamError;
use super::event::Event;
use super::subscription::Subscription;

type ObserverFn<T> = Arc<dyn Fn(Event<T>) + Send + Sync>;
type SubscribeFn<T> = Arc<dyn Fn(Sink<T>) + Send + Sync>;

/// Producer-side handle for one subscription.
///
/// Enforces the stream grammar: values until the first terminal event,
/// nothing afterwards, nothing once the subscription is cancelled.
/// A terminal event cancels the subscription so producers release their
/// resources.
pub struct Sink<T> {
    observer: ObserverFn<T>,
    stopped: Arc<AtomicBool>,
    subscription: Subscription,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            observer: Arc::clone(&self.observer),
            stopped: Arc::clone(&self.stopped),
            subscription: self.subscription.clone(),
        }
    }
}

impl<T> Sink<T> {
    fn new(observer: ObserverFn<T>, subscription: Subscription) -> Self {
        Self {
            observer,
            stopped: Arc::new(AtomicBool::new(false)),
            subscription,
        }
    }

    pub fn next(&self, value: T) {
        if self.is_closed() {
            return;
        }
        (self.observer)(Event::Next(value));
    }

    pub fn error(&self, err: StreamError) {
        self.terminate(Event::Error(err));
    }

    pub fn complete(&self) {
        self.terminate(Event::Completed);
    }

    pub fn send(&self, event: Event<T>) {
        match event {
            Event::Next(value) => self.next(value),
            terminal => self.terminate(terminal),
        }
    }

    /// True once a terminal event was sent or the subscriber cancelled.
    pub fn is_closed(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.subscription.is_cancelled()
    }

    /// Subscription the producer should attach its teardown work to.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    fn terminate(&self, event: Event<T>) {
        if self.subscription.is_cancelled() || self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        (self.observer)(event);
        self.subscription.cancel();
    }
}

/// A cold, push-based sequence of values.
///
/// Each `subscribe` runs the producer anew; the returned [`Subscription`]
/// stops delivery and releases timers and tasks tied to it.
pub struct Observable<T> {
    subscribe_fn: SubscribeFn<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Build an observable from a producer that drives the given sink.
    pub fn create(producer: impl Fn(Sink<T>) + Send + Sync + 'static) -> Self {
        Self {
            subscribe_fn: Arc::new(producer),
        }
    }

    /// Subscribe with an observer receiving every event.
    pub fn subscribe(&self, observer: impl Fn(Event<T>) + Send + Sync + 'static) -> Subscription {
        let subscription = Subscription::new();
        self.subscribe_sink(Sink::new(Arc::new(observer), subscription.clone()));
        subscription
    }

    /// Subscribe to values only; terminal events are ignored.
    pub fn subscribe_next(&self, on_next: impl Fn(T) + Send + Sync + 'static) -> Subscription {
        self.subscribe(move |event| {
            if let Event::Next(value) = event {
                on_next(value);
            }
        })
    }

    /// Drive an existing sink from this observable.
    ///
    /// The sink's subscription controls the upstream one: operators use this
    /// to forward into a downstream sink.
    pub fn subscribe_sink(&self, sink: Sink<T>) {
        if sink.is_closed() {
            return;
        }
        (self.subscribe_fn)(sink);
    }

    /// Subscribe upstream on behalf of `downstream` and tie both lifetimes:
    /// cancelling downstream cancels the upstream subscription.
    pub(crate) fn subscribe_for<U: Send + 'static>(
        &self,
        downstream: &Sink<U>,
        observer: impl Fn(Event<T>) + Send + Sync + 'static,
    ) -> Subscription {
        let upstream = self.subscribe(observer);
        downstream.subscription().attach(&upstream);
        upstream
    }

    pub fn empty() -> Self {
        Self::create(|sink| sink.complete())
    }

    /// Never emits and never terminates.
    pub fn never() -> Self {
        Self::create(|_sink| {})
    }

    pub fn error(err: StreamError) -> Self {
        Self::create(move |sink| sink.error(err.clone()))
    }

    /// Run a future on the ambient tokio runtime and emit its output once.
    ///
    /// Cancelling the subscription aborts the task. Subscribing outside a
    /// runtime fails with [`StreamError::NoRuntime`].
    pub fn from_future<F, Fut>(make: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::try_from_future(move || {
            let fut = make();
            async move { Ok::<T, StreamError>(fut.await) }
        })
    }

    /// Like [`Observable::from_future`] for fallible producers; an `Err`
    /// becomes the terminal error.
    pub fn try_from_future<F, Fut, E>(make: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<StreamError> + Send + 'static,
    {
        Self::create(move |sink| {
            let Ok(handle) = tokio::runtime::Handle::try_current() else {
                sink.error(StreamError::NoRuntime {
                    operator: "from_future",
                });
                return;
            };
            let fut = make();
            let task_sink = sink.clone();
            let task = handle.spawn(async move {
                match fut.await {
                    Ok(value) => {
                        task_sink.next(value);
                        task_sink.complete();
                    }
                    Err(err) => task_sink.error(err.into()),
                }
            });
            sink.subscription().add(move || task.abort());
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn just(value: T) -> Self {
        Self::create(move |sink| {
            sink.next(value.clone());
            sink.complete();
        })
    }

    pub fn from_iter(values: impl IntoIterator<Item = T>) -> Self {
        let values: Arc<[T]> = values.into_iter().collect();
        Self::create(move |sink| {
            for value in values.iter() {
                if sink.is_closed() {
                    return;
                }
                sink.next(value.clone());
            }
            sink.complete();
        })
    }
}
