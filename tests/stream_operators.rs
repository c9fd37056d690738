mod common;

use std::sync::Arc;
use std::time::Duration;

use bibbi_reactor::stream::{BehaviorSubject, Observable, PublishSubject, StreamError};
use common::*;

fn delayed(value: u32, ms: u64) -> Observable<u32> {
    Observable::from_future(move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        value
    })
}

#[tokio::test(start_paused = true)]
async fn flat_map_emits_in_arrival_order() {
    let source = Observable::from_iter([30u64, 10, 20]);
    let merged = source.flat_map(|ms| delayed(ms as u32, ms));
    let recorder = Recorder::attach(&merged);

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(recorder.values(), vec![10, 20, 30]);
    assert!(recorder.is_completed());
}

#[tokio::test(start_paused = true)]
async fn concat_waits_for_each_source() {
    let chained = Observable::concat([delayed(1, 30), delayed(2, 10)]);
    let recorder = Recorder::attach(&chained);

    tokio::time::sleep(Duration::from_millis(35)).await;
    assert_eq!(recorder.values(), vec![1]);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(recorder.values(), vec![1, 2]);
    assert!(recorder.is_completed());
}

#[tokio::test(start_paused = true)]
async fn cancelling_aborts_pending_future() {
    let recorder = Recorder::attach(&delayed(7, 20));
    recorder.subscription.cancel();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(recorder.len(), 0);
}

#[test]
fn from_future_outside_runtime_fails() {
    let recorder = Recorder::attach(&delayed(1, 1));
    assert!(matches!(
        recorder.error(),
        Some(StreamError::NoRuntime { .. })
    ));
}

#[test]
fn error_ends_stream_and_skips_later_values() {
    let subject = PublishSubject::new();
    let recorder = Recorder::attach(&subject.observable().map(|n: i32| n * 2));

    subject.on_next(1);
    subject.on_error(StreamError::msg("lost"));
    subject.on_next(2);

    assert_eq!(recorder.values(), vec![2]);
    assert_eq!(recorder.error().map(|e| e.to_string()), Some("lost".into()));
    assert!(recorder.subscription.is_cancelled());
}

#[test]
fn catch_error_switches_to_fallback() {
    let failing = Observable::concat([
        Observable::just(1),
        Observable::error(StreamError::msg("offline")),
    ]);
    let recovered = failing.catch_error(|_| Observable::from_iter([8, 9]));
    let recorder = Recorder::attach(&recovered);

    assert_eq!(recorder.values(), vec![1, 8, 9]);
    assert!(recorder.is_completed());
}

#[test]
fn skip_until_and_take_until_gate_values() {
    let values = PublishSubject::new();
    let open = PublishSubject::<()>::new();
    let close = PublishSubject::<()>::new();
    let gated = values
        .observable()
        .skip_until(&open.observable())
        .take_until(&close.observable());
    let recorder = Recorder::attach(&gated);

    values.on_next("before");
    open.on_next(());
    values.on_next("during");
    close.on_next(());
    values.on_next("after");

    assert_eq!(recorder.values(), vec!["during"]);
    assert!(recorder.is_completed());
}

#[test]
fn distinct_until_changed_drops_repeats() {
    let subject = BehaviorSubject::new(0);
    let recorder = Recorder::attach(&subject.observable().distinct_until_changed());
    for n in [0, 1, 1, 2, 2, 2, 1] {
        subject.on_next(n);
    }
    assert_eq!(recorder.values(), vec![0, 1, 2, 1]);
}

#[tokio::test(start_paused = true)]
async fn throttle_keeps_first_value_per_window() {
    let subject = PublishSubject::new();
    let recorder = Recorder::attach(&subject.observable().throttle(Duration::from_millis(100)));

    subject.on_next(1);
    subject.on_next(2);
    tokio::time::sleep(Duration::from_millis(50)).await;
    subject.on_next(3);
    tokio::time::sleep(Duration::from_millis(60)).await;
    subject.on_next(4);

    assert_eq!(recorder.values(), vec![1, 4]);
}

#[tokio::test(start_paused = true)]
async fn debounce_emits_after_quiet_period() {
    let subject = PublishSubject::new();
    let recorder = Recorder::attach(&subject.observable().debounce(Duration::from_millis(100)));

    subject.on_next("h");
    tokio::time::sleep(Duration::from_millis(40)).await;
    subject.on_next("he");
    tokio::time::sleep(Duration::from_millis(40)).await;
    subject.on_next("hey");
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(recorder.values(), vec!["hey"]);
}

#[test]
fn merged_threads_deliver_one_at_a_time() {
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let in_flight = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let overlaps = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let merged = Observable::merge([left.observable(), right.observable()]);
    let _sub = merged.subscribe_next({
        let in_flight = Arc::clone(&in_flight);
        let overlaps = Arc::clone(&overlaps);
        move |_: u32| {
            use std::sync::atomic::Ordering;
            if in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            std::thread::yield_now();
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    });

    let handles: Vec<_> = [left, right]
        .into_iter()
        .map(|subject| {
            std::thread::spawn(move || {
                for n in 0..200 {
                    subject.on_next(n);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(overlaps.load(std::sync::atomic::Ordering::SeqCst), 0);
}
