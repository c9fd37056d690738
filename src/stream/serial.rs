//! Queue-drain trampoline that serializes delivery.
//!
//! Producers on any thread push items; whichever caller finds the queue idle
//! becomes the drainer and delivers items one at a time, in push order,
//! until the queue is empty. Pushes made while draining (from other threads
//! or re-entrantly from inside `deliver`) are queued, never delivered
//! recursively.

use std::collections::VecDeque;

use parking_lot::Mutex;

pub(crate) struct SerialQueue<T> {
    inner: Mutex<SerialState<T>>,
}

struct SerialState<T> {
    queue: VecDeque<T>,
    draining: bool,
}

impl<T> SerialQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(SerialState {
                queue: VecDeque::new(),
                draining: false,
            }),
        }
    }

    /// Enqueue `item` and drain if nobody else is.
    ///
    /// Every producer of one queue must pass the same delivery routine:
    /// the active drainer delivers items pushed by others.
    pub(crate) fn push(&self, item: T, mut deliver: impl FnMut(T)) {
        {
            let mut state = self.inner.lock();
            state.queue.push_back(item);
            if state.draining {
                return;
            }
            state.draining = true;
        }

        let inner = scopeguard::guard_on_unwind(&self.inner, |inner| {
            let mut state = inner.lock();
            state.queue.clear();
            state.draining = false;
        });

        loop {
            let next = {
                let mut state = inner.lock();
                match state.queue.pop_front() {
                    Some(item) => item,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };
            deliver(next);
        }
    }
}
