//! Reactor trait: per-screen policy consumed by the container runtime.

use crate::stream::Observable;

use super::intent::Intent;
use super::reducer::Reducer;

/// Per-screen Action → Mutation → State policy.
///
/// `mutate` owns all side effects and asynchrony; `reduce` (from
/// [`Reducer`]) stays pure. Transforms merge externally sourced actions or
/// mutations into the pipeline, typically from an injected
/// [`EventBus`](crate::bus::EventBus).
pub trait Reactor: Reducer + Send + Sync + 'static {
    type Action: Intent;

    /// State the container starts from.
    fn initial_state(&self) -> Self::State;

    /// Resolve one action into zero or more mutations.
    ///
    /// `state` is the snapshot current when the action reaches this stage.
    /// A failure on the returned stream only drops this action's
    /// contribution; map errors to an explicit mutation to surface them.
    fn mutate(&self, state: &Self::State, action: Self::Action) -> Observable<Self::Mutation>;

    /// Merge external actions before they reach `mutate`.
    fn transform_action(&self, action: Observable<Self::Action>) -> Observable<Self::Action> {
        action
    }

    /// Merge external mutations before they reach `reduce`.
    ///
    /// An error or completion of the returned stream ends the container's
    /// state stream for good.
    fn transform_mutation(&self, mutation: Observable<Self::Mutation>) -> Observable<Self::Mutation> {
        mutation
    }
}
