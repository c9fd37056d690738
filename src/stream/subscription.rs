//! Cancellation handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

type Teardown = Box<dyn FnOnce() + Send>;

/// Key returned by [`Subscription::add`], used to unregister a teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeardownKey(u64);

/// Cancellation handle for a subscription.
///
/// Cloning shares the handle. Cancelling runs every registered teardown
/// exactly once; teardowns added after cancellation run immediately.
/// Dropping a handle does not cancel it.
#[derive(Clone, Default)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

#[derive(Default)]
struct SubscriptionInner {
    cancelled: AtomicBool,
    next_key: AtomicU64,
    teardowns: Mutex<HashMap<u64, Teardown>>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel and release everything tied to this subscription.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // Teardowns run outside the lock: they may cancel other
        // subscriptions that in turn call `remove` on this one.
        let teardowns: Vec<Teardown> = {
            let mut guard = self.inner.teardowns.lock();
            guard.drain().map(|(_, teardown)| teardown).collect()
        };
        for teardown in teardowns {
            teardown();
        }
    }

    /// Register work to run on cancellation.
    pub fn add(&self, teardown: impl FnOnce() + Send + 'static) -> TeardownKey {
        let key = self.inner.next_key.fetch_add(1, Ordering::Relaxed);
        {
            let mut guard = self.inner.teardowns.lock();
            if !self.is_cancelled() {
                guard.insert(key, Box::new(teardown));
                return TeardownKey(key);
            }
        }
        teardown();
        TeardownKey(key)
    }

    /// Cancel `child` whenever this subscription is cancelled.
    pub fn add_child(&self, child: Subscription) -> TeardownKey {
        self.add(move || child.cancel())
    }

    /// Tie `child` to this subscription while the child is live.
    ///
    /// Cancelling `self` cancels `child`; once `child` ends on its own it
    /// unregisters itself, so long-lived parents do not accumulate
    /// finished children.
    pub fn attach(&self, child: &Subscription) {
        let key = self.add_child(child.clone());
        let parent = self.clone();
        child.add(move || parent.remove(key));
    }

    /// Drop a teardown without running it.
    pub fn remove(&self, key: TeardownKey) {
        let removed = self.inner.teardowns.lock().remove(&key.0);
        drop(removed);
    }

    #[cfg(test)]
    pub(crate) fn pending_teardowns(&self) -> usize {
        self.inner.teardowns.lock().len()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
