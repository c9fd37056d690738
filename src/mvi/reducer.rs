//! Reducer trait: the pure half of a reactor.

use super::state::UiState;

/// Reducer transforms state based on mutations.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure, total function: (State, Mutation) -> State.
/// It takes no `self`, so it cannot reach collaborators or side effects.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State: UiState;

    /// The already-resolved state deltas this reducer applies.
    type Mutation: Send + 'static;

    /// Apply one mutation and return the next state.
    fn reduce(state: Self::State, mutation: Self::Mutation) -> Self::State;
}
