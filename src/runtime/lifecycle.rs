use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a container.
///
/// ```text
/// Idle ──(first state subscriber)──→ Activating ──(pending flushed)──→ Active
///   │                                     │                              │
///   └──────────────┬──────────────────────┴──────────────┬───────────────┘
///                  ↓                                     ↓
///              Destroyed                     Terminated (mutation stream ended)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Constructed, nobody observes state yet; actions are buffered.
    Idle = 0,
    /// Pipeline subscribed, buffered actions being replayed.
    Activating = 1,
    Active = 2,
    /// The merged mutation stream errored or completed.
    Terminated = 3,
    /// Torn down by its owner.
    Destroyed = 4,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::Idle,
            1 => Phase::Activating,
            2 => Phase::Active,
            3 => Phase::Terminated,
            _ => Phase::Destroyed,
        }
    }

    /// True once no further state will ever be emitted.
    pub fn is_final(self) -> bool {
        matches!(self, Phase::Terminated | Phase::Destroyed)
    }
}

pub(crate) struct Lifecycle {
    phase: AtomicU8,
    reactor: &'static str,
}

impl Lifecycle {
    pub(crate) fn new(reactor: &'static str) -> Self {
        Self {
            phase: AtomicU8::new(Phase::Idle as u8),
            reactor,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Move `from` → `to`; false if the phase was not `from`.
    pub(crate) fn transition(&self, from: Phase, to: Phase) -> bool {
        let moved = self
            .phase
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if moved {
            tracing::debug!(reactor = self.reactor, ?from, ?to, "container phase changed");
        }
        moved
    }

    /// Enter a final phase unless already final. Returns the previous phase.
    pub(crate) fn finish(&self, to: Phase) -> Phase {
        let mut current = self.phase();
        loop {
            if current.is_final() {
                return current;
            }
            match self.phase.compare_exchange(
                current as u8,
                to as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    tracing::debug!(reactor = self.reactor, from = ?current, ?to, "container phase changed");
                    return current;
                }
                Err(actual) => current = Phase::from_u8(actual),
            }
        }
    }
}
