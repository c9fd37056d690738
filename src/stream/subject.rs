//! Hot multicast sources.
//!
//! Every operation on a subject (value, terminal event, new subscriber) is
//! funnelled through one [`SerialQueue`], so each subscriber sees events in
//! a single global order and a subscriber of a [`BehaviorSubject`] always
//! receives its replayed value before anything newer.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::StreamError;
use super::event::Event;
use super::observable::{Observable, Sink};
use super::serial::SerialQueue;

enum Op<T> {
    Next(T),
    Terminate(Event<T>),
    Attach(Sink<T>),
}

struct CoreState<T> {
    observers: BTreeMap<u64, Sink<T>>,
    next_id: u64,
    latest: Option<T>,
    terminal: Option<Event<T>>,
}

struct SubjectCore<T> {
    replay_latest: bool,
    state: Mutex<CoreState<T>>,
    queue: SerialQueue<Op<T>>,
}

impl<T: Clone + Send + 'static> SubjectCore<T> {
    fn new(replay_latest: bool, latest: Option<T>) -> Arc<Self> {
        Arc::new(Self {
            replay_latest,
            state: Mutex::new(CoreState {
                observers: BTreeMap::new(),
                next_id: 0,
                latest,
                terminal: None,
            }),
            queue: SerialQueue::new(),
        })
    }

    fn push(self: &Arc<Self>, op: Op<T>) {
        self.queue.push(op, |op| self.deliver(op));
    }

    fn deliver(self: &Arc<Self>, op: Op<T>) {
        match op {
            Op::Next(value) => {
                let sinks: Vec<Sink<T>> = {
                    let mut state = self.state.lock();
                    if state.terminal.is_some() {
                        return;
                    }
                    if self.replay_latest {
                        state.latest = Some(value.clone());
                    }
                    state.observers.values().cloned().collect()
                };
                for sink in sinks {
                    sink.next(value.clone());
                }
            }
            Op::Terminate(event) => {
                let sinks: Vec<Sink<T>> = {
                    let mut state = self.state.lock();
                    if state.terminal.is_some() {
                        return;
                    }
                    state.terminal = Some(event.clone());
                    std::mem::take(&mut state.observers).into_values().collect()
                };
                for sink in sinks {
                    sink.send(event.clone());
                }
            }
            Op::Attach(sink) => {
                let (id, replay) = {
                    let mut state = self.state.lock();
                    if let Some(terminal) = state.terminal.clone() {
                        drop(state);
                        sink.send(terminal);
                        return;
                    }
                    let id = state.next_id;
                    state.next_id += 1;
                    state.observers.insert(id, sink.clone());
                    (id, state.latest.clone())
                };

                let core = Arc::downgrade(self);
                sink.subscription().add(move || {
                    if let Some(core) = core.upgrade() {
                        let removed = core.state.lock().observers.remove(&id);
                        drop(removed);
                    }
                });

                if let Some(value) = replay {
                    sink.next(value);
                }
            }
        }
    }

    fn observable(self: &Arc<Self>) -> Observable<T> {
        let core = Arc::clone(self);
        Observable::create(move |sink| core.push(Op::Attach(sink)))
    }

    fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    fn is_terminated(&self) -> bool {
        self.state.lock().terminal.is_some()
    }
}

/// Multicasts values to current subscribers without replay.
///
/// Subscribers joining after a terminal event receive that event at once.
pub struct PublishSubject<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for PublishSubject<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + 'static> Default for PublishSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> PublishSubject<T> {
    pub fn new() -> Self {
        Self {
            core: SubjectCore::new(false, None),
        }
    }

    pub fn on_next(&self, value: T) {
        self.core.push(Op::Next(value));
    }

    pub fn on_error(&self, err: StreamError) {
        self.core.push(Op::Terminate(Event::Error(err)));
    }

    pub fn on_completed(&self) {
        self.core.push(Op::Terminate(Event::Completed));
    }

    pub fn observable(&self) -> Observable<T> {
        self.core.observable()
    }

    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn is_terminated(&self) -> bool {
        self.core.is_terminated()
    }
}

/// Holds a current value and replays it to every new subscriber.
pub struct BehaviorSubject<T> {
    core: Arc<SubjectCore<T>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T: Clone + Send + 'static> BehaviorSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            core: SubjectCore::new(true, Some(initial)),
        }
    }

    /// Latest value delivered to subscribers.
    pub fn value(&self) -> Option<T> {
        self.core.state.lock().latest.clone()
    }

    pub fn on_next(&self, value: T) {
        self.core.push(Op::Next(value));
    }

    pub fn on_error(&self, err: StreamError) {
        self.core.push(Op::Terminate(Event::Error(err)));
    }

    pub fn on_completed(&self) {
        self.core.push(Op::Terminate(Event::Completed));
    }

    pub fn observable(&self) -> Observable<T> {
        self.core.observable()
    }

    pub fn observer_count(&self) -> usize {
        self.core.observer_count()
    }

    pub fn is_terminated(&self) -> bool {
        self.core.is_terminated()
    }
}
