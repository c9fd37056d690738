//! Base trait for actions (user/system intents) fed into a container.

/// Marker trait for action objects.
///
/// Actions represent:
/// - User gestures (taps, text edits, swipes)
/// - Lifecycle events (view loaded, screen appeared)
/// - External signals merged in by a transform
///
/// Actions are turned into mutations by [`Reactor::mutate`](super::Reactor::mutate).
pub trait Intent: Clone + Send + 'static {}
