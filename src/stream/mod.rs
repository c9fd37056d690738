//! Minimal push-based event streams.
//!
//! # Model
//!
//! ```text
//! producer ──→ Sink<T> ──→ operators ──→ observer(Event<T>)
//!                 │
//!                 └── Subscription (cancel → teardown timers, tasks, children)
//! ```
//!
//! - [`Observable`] is cold: every subscription runs its producer.
//! - [`PublishSubject`] / [`BehaviorSubject`] are hot multicast sources.
//! - `Error` and `Completed` are terminal; cancelling stops delivery.
//! - Concurrent sources merged by `flat_map`/`merge` are delivered
//!   downstream one event at a time.

mod adapter;
mod error;
mod event;
mod observable;
mod operators;
mod serial;
mod subject;
mod subscription;
mod time;

pub use adapter::EventStream;
pub use error::StreamError;
pub use event::Event;
pub use observable::{Observable, Sink};
pub use subject::{BehaviorSubject, PublishSubject};
pub use subscription::{Subscription, TeardownKey};

pub(crate) use serial::SerialQueue;
