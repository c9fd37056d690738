//! Composition operators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::StreamError;
use super::event::Event;
use super::observable::{Observable, Sink};
use super::serial::SerialQueue;
use super::subscription::Subscription;

impl<T: Send + 'static> Observable<T> {
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Observable::create(move |sink: Sink<U>| {
            let f = Arc::clone(&f);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => downstream.next(f(value)),
                Event::Error(err) => downstream.error(err),
                Event::Completed => downstream.complete(),
            });
        })
    }

    pub fn filter<F>(&self, predicate: F) -> Observable<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate = Arc::new(predicate);
        Observable::create(move |sink: Sink<T>| {
            let predicate = Arc::clone(&predicate);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) if !predicate(&value) => {}
                event => downstream.send(event),
            });
        })
    }

    /// Side-effect hook on every value; the value passes through unchanged.
    pub fn inspect<F>(&self, f: F) -> Observable<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Observable::create(move |sink: Sink<T>| {
            let f = Arc::clone(&f);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| {
                if let Event::Next(value) = &event {
                    f(value);
                }
                downstream.send(event);
            });
        })
    }

    /// Map every value to an inner stream and merge all inner streams.
    ///
    /// Inner streams run concurrently; their values are interleaved in the
    /// order they become available and delivered downstream one at a time.
    /// Values of one inner stream keep their relative order. Completes when
    /// the source and every inner stream completed; the first error from
    /// any of them terminates the output.
    pub fn flat_map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Observable<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let f = Arc::new(f);
        Observable::create(move |sink: Sink<U>| {
            let merge = Arc::new(MergeState::new(sink.clone()));
            let f = Arc::clone(&f);
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => merge.add_inner(&f(value)),
                Event::Error(err) => merge.emit(Event::Error(err)),
                Event::Completed => merge.finish_one(),
            });
        })
    }

    pub fn merge(sources: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
        Observable::from_iter(sources).flat_map(|inner| inner)
    }

    pub fn merge_with(&self, other: &Observable<T>) -> Observable<T> {
        Observable::merge([self.clone(), other.clone()])
    }

    /// Subscribe to each source only after the previous one completed.
    pub fn concat(sources: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
        let sources: Arc<[Observable<T>]> = sources.into_iter().collect();
        Observable::create(move |sink| subscribe_concat(Arc::clone(&sources), 0, sink))
    }

    pub fn concat_with(&self, next: &Observable<T>) -> Observable<T> {
        Observable::concat([self.clone(), next.clone()])
    }

    /// Suppress a value when `same(previous, value)` holds for the last
    /// value emitted.
    pub fn distinct_until_changed_by<F>(&self, same: F) -> Observable<T>
    where
        T: Clone,
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let source = self.clone();
        let same = Arc::new(same);
        Observable::create(move |sink: Sink<T>| {
            let same = Arc::clone(&same);
            let last: Mutex<Option<T>> = Mutex::new(None);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => {
                    {
                        let mut last = last.lock();
                        if matches!(last.as_ref(), Some(previous) if same(previous, &value)) {
                            return;
                        }
                        *last = Some(value.clone());
                    }
                    downstream.next(value);
                }
                terminal => downstream.send(terminal),
            });
        })
    }

    pub fn distinct_until_changed(&self) -> Observable<T>
    where
        T: Clone + PartialEq,
    {
        self.distinct_until_changed_by(|a, b| a == b)
    }

    /// Drop values until `signal` emits its first value.
    ///
    /// The signal subscription is released as soon as the gate opens. An
    /// error on the signal terminates the output.
    pub fn skip_until<S: Send + 'static>(&self, signal: &Observable<S>) -> Observable<T> {
        let source = self.clone();
        let signal = signal.clone();
        Observable::create(move |sink: Sink<T>| {
            let open = Arc::new(AtomicBool::new(false));
            let signal_slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

            let gate = Arc::clone(&open);
            let slot = Arc::clone(&signal_slot);
            let on_signal_error = sink.clone();
            let signal_sub = signal.subscribe_for(&sink, move |event| match event {
                Event::Next(_) => {
                    gate.store(true, Ordering::SeqCst);
                    let pending = slot.lock().take();
                    if let Some(sub) = pending {
                        sub.cancel();
                    }
                }
                Event::Error(err) => on_signal_error.error(err),
                Event::Completed => {}
            });
            if open.load(Ordering::SeqCst) {
                signal_sub.cancel();
            } else {
                *signal_slot.lock() = Some(signal_sub);
            }

            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => {
                    if open.load(Ordering::SeqCst) {
                        downstream.next(value);
                    }
                }
                terminal => downstream.send(terminal),
            });
        })
    }

    /// Complete as soon as `signal` emits.
    pub fn take_until<S: Send + 'static>(&self, signal: &Observable<S>) -> Observable<T> {
        let source = self.clone();
        let signal = signal.clone();
        Observable::create(move |sink: Sink<T>| {
            let on_signal = sink.clone();
            signal.subscribe_for(&sink, move |event| match event {
                Event::Next(_) => on_signal.complete(),
                Event::Error(err) => on_signal.error(err),
                Event::Completed => {}
            });
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| downstream.send(event));
        })
    }

    /// Emit at most `count` values, then complete.
    pub fn take(&self, count: usize) -> Observable<T> {
        let source = self.clone();
        Observable::create(move |sink: Sink<T>| {
            if count == 0 {
                sink.complete();
                return;
            }
            let seen = AtomicUsize::new(0);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Next(value) => {
                    let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
                    if n > count {
                        return;
                    }
                    downstream.next(value);
                    if n == count {
                        downstream.complete();
                    }
                }
                terminal => downstream.send(terminal),
            });
        })
    }

    /// Replace a terminal error with the stream returned by `handler`.
    pub fn catch_error<F>(&self, handler: F) -> Observable<T>
    where
        F: Fn(StreamError) -> Observable<T> + Send + Sync + 'static,
    {
        let source = self.clone();
        let handler = Arc::new(handler);
        Observable::create(move |sink: Sink<T>| {
            let handler = Arc::clone(&handler);
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| match event {
                Event::Error(err) => {
                    let fallback_sink = downstream.clone();
                    handler(err).subscribe_for(&downstream, move |event| fallback_sink.send(event));
                }
                event => downstream.send(event),
            });
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn start_with(&self, values: impl IntoIterator<Item = T>) -> Observable<T> {
        Observable::concat([Observable::from_iter(values), self.clone()])
    }
}

fn subscribe_concat<T: Send + 'static>(sources: Arc<[Observable<T>]>, index: usize, sink: Sink<T>) {
    let Some(source) = sources.get(index) else {
        sink.complete();
        return;
    };
    let downstream = sink.clone();
    let rest = Arc::clone(&sources);
    source.subscribe_for(&sink, move |event| match event {
        Event::Next(value) => downstream.next(value),
        Event::Error(err) => downstream.error(err),
        Event::Completed => subscribe_concat(Arc::clone(&rest), index + 1, downstream.clone()),
    });
}

struct MergeState<U> {
    sink: Sink<U>,
    queue: SerialQueue<Event<U>>,
    // The outer source counts as one live stream.
    active: AtomicUsize,
}

impl<U: Send + 'static> MergeState<U> {
    fn new(sink: Sink<U>) -> Self {
        Self {
            sink,
            queue: SerialQueue::new(),
            active: AtomicUsize::new(1),
        }
    }

    fn emit(&self, event: Event<U>) {
        let sink = &self.sink;
        self.queue.push(event, |event| sink.send(event));
    }

    fn finish_one(&self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.emit(Event::Completed);
        }
    }

    fn add_inner(self: &Arc<Self>, inner: &Observable<U>) {
        self.active.fetch_add(1, Ordering::SeqCst);
        let this = Arc::clone(self);
        inner.subscribe_for(&self.sink, move |event| match event {
            Event::Completed => this.finish_one(),
            event => this.emit(event),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone + Send + 'static>(source: &Observable<T>) -> (Arc<Mutex<Vec<T>>>, Arc<AtomicBool>) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let done = Arc::new(AtomicBool::new(false));
        let (v, d) = (Arc::clone(&values), Arc::clone(&done));
        source.subscribe(move |event| match event {
            Event::Next(value) => v.lock().push(value),
            _ => d.store(true, Ordering::SeqCst),
        });
        (values, done)
    }

    #[test]
    fn map_and_filter_preserve_order() {
        let source = Observable::from_iter(1..=6).filter(|n| n % 2 == 0).map(|n| n * 10);
        let (values, done) = collect(&source);
        assert_eq!(*values.lock(), vec![20, 40, 60]);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn flat_map_completes_after_all_inner_streams() {
        let source = Observable::from_iter(vec![1, 2]).flat_map(|n| Observable::from_iter(vec![n, n]));
        let (values, done) = collect(&source);
        assert_eq!(*values.lock(), vec![1, 1, 2, 2]);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn flat_map_waits_for_pending_inner() {
        let never_done = Observable::from_iter(vec![1]).flat_map(|_| Observable::<i32>::never());
        let (_values, done) = collect(&never_done);
        assert!(!done.load(Ordering::SeqCst));
    }

    #[test]
    fn concat_runs_sources_in_sequence() {
        let source = Observable::concat([
            Observable::from_iter(vec!["a", "b"]),
            Observable::just("c"),
            Observable::empty(),
            Observable::just("d"),
        ]);
        let (values, done) = collect(&source);
        assert_eq!(*values.lock(), vec!["a", "b", "c", "d"]);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn concat_holds_later_sources_until_earlier_complete() {
        let source = Observable::concat([Observable::never(), Observable::just(1)]);
        let (values, _done) = collect(&source);
        assert!(values.lock().is_empty());
    }

    #[test]
    fn distinct_until_changed_drops_consecutive_duplicates() {
        let source = Observable::from_iter(vec![1, 1, 2, 2, 1, 3, 3]).distinct_until_changed();
        let (values, _) = collect(&source);
        assert_eq!(*values.lock(), vec![1, 2, 1, 3]);
    }

    #[test]
    fn distinct_until_changed_by_uses_key() {
        let source = Observable::from_iter(vec!["apple", "avocado", "banana", "blueberry", "cherry"])
            .distinct_until_changed_by(|a, b| a.chars().next() == b.chars().next());
        let (values, _) = collect(&source);
        assert_eq!(*values.lock(), vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn take_stops_after_count() {
        let (values, done) = collect(&Observable::from_iter(1..=10).take(3));
        assert_eq!(*values.lock(), vec![1, 2, 3]);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn catch_error_switches_to_fallback() {
        let failing = Observable::concat([
            Observable::just(1),
            Observable::error(StreamError::msg("offline")),
            Observable::just(99),
        ]);
        let (values, done) = collect(&failing.catch_error(|_| Observable::just(-1)));
        assert_eq!(*values.lock(), vec![1, -1]);
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn start_with_prepends_values() {
        let (values, _) = collect(&Observable::just(3).start_with(vec![1, 2]));
        assert_eq!(*values.lock(), vec![1, 2, 3]);
    }
}
