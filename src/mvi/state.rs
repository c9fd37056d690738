//! Base trait for screen state.

/// Marker trait for state snapshots.
///
/// States should be:
/// - Immutable per version (Clone to create the next state)
/// - Self-contained (all data a screen needs to render)
/// - Comparable (PartialEq for change detection downstream)
pub trait UiState: Clone + PartialEq + Send + Sync + 'static {}
