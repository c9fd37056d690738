//! Time-window operators.
//!
//! Both read `tokio::time::Instant`, so tests can drive them with a paused
//! clock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::error::StreamError;
use super::event::Event;
use super::observable::{Observable, Sink};

struct DebounceState<T> {
    generation: u64,
    pending: Option<T>,
    timer: Option<JoinHandle<()>>,
}

impl<T> DebounceState<T> {
    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Leading-edge throttle.
    ///
    /// Emits a value, then drops everything arriving within `window`; the
    /// first value after the window is emitted and restarts it. Needs no
    /// timer, so nothing is left running after cancellation.
    pub fn throttle(&self, window: Duration) -> Observable<T> {
        let source = self.clone();
        Observable::create(move |sink: Sink<T>| {
            let last_emit: Mutex<Option<Instant>> = Mutex::new(None);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => {
                    let now = Instant::now();
                    let open = {
                        let mut last_emit = last_emit.lock();
                        let open = last_emit.map_or(true, |at| now.duration_since(at) >= window);
                        if open {
                            *last_emit = Some(now);
                        }
                        open
                    };
                    if open {
                        downstream.next(value);
                    }
                }
                terminal => downstream.send(terminal),
            });
        })
    }

    /// Trailing-edge debounce.
    ///
    /// Emits the latest value once `window` passed without a newer one. A
    /// pending value is flushed when the source completes and dropped when
    /// it errors. Cancelling the subscription aborts the pending timer.
    pub fn debounce(&self, window: Duration) -> Observable<T> {
        let source = self.clone();
        Observable::create(move |sink: Sink<T>| {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                sink.error(StreamError::NoRuntime {
                    operator: "debounce",
                });
                return;
            };

            let state = Arc::new(Mutex::new(DebounceState {
                generation: 0,
                pending: None,
                timer: None,
            }));

            let on_cancel = Arc::clone(&state);
            sink.subscription().add(move || on_cancel.lock().stop_timer());

            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => {
                    let mut guard = state.lock();
                    guard.generation += 1;
                    guard.pending = Some(value);
                    guard.stop_timer();

                    let generation = guard.generation;
                    let timer_state = Arc::clone(&state);
                    let timer_sink = downstream.clone();
                    guard.timer = Some(runtime.spawn(async move {
                        tokio::time::sleep(window).await;
                        let value = {
                            let mut guard = timer_state.lock();
                            if guard.generation != generation {
                                return;
                            }
                            guard.timer = None;
                            guard.pending.take()
                        };
                        if let Some(value) = value {
                            timer_sink.next(value);
                        }
                    }));
                }
                Event::Error(err) => {
                    {
                        let mut guard = state.lock();
                        guard.stop_timer();
                        guard.pending = None;
                    }
                    downstream.error(err);
                }
                Event::Completed => {
                    let pending = {
                        let mut guard = state.lock();
                        guard.stop_timer();
                        guard.pending.take()
                    };
                    if let Some(value) = pending {
                        downstream.next(value);
                    }
                    downstream.complete();
                }
            });
        })
    }
}
