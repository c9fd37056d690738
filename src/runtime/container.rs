//! The Action → Mutation → State pipeline of one screen instance.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

use crate::config::RuntimeConfig;
use crate::mvi::{Reactor, Reducer};
use crate::stream::{
    BehaviorSubject, Event, Observable, PublishSubject, SerialQueue, Sink, StreamError,
    Subscription,
};

use super::error::ReactorError;
use super::lifecycle::{Lifecycle, Phase};

/// Unit of work for the reduction stage.
enum Step<M> {
    Reduce(M),
    /// The merged mutation stream ended, with an error or by completing.
    Finish(Option<StreamError>),
}

/// State container running a [`Reactor`].
///
/// ```text
/// dispatch ──→ actions ──→ transform_action ──→ flat_map(mutate) ─┐
///                                                                 ↓
///  observe_state ←── states ←── reduce (serial) ←── transform_mutation
/// ```
///
/// The container is owned by its screen and holds no reference back to
/// it. Dropping the container tears it down.
///
/// Mutations from concurrently running `mutate` streams are reduced one at
/// a time in the order they arrive, which is not necessarily the order the
/// actions were dispatched in.
///
/// Every entry into the pipeline (dispatch, activation, a value produced by
/// a background `mutate` stream or a transform) runs under one re-entrant
/// turn lock. A thread delivering a value therefore finishes reducing and
/// publishing it before another thread's `dispatch` starts, and that
/// dispatch returns only after its synchronous mutations are reduced.
/// Re-entrant dispatch from a state observer is queued behind the state
/// being delivered. An observer must not block on another thread that
/// dispatches into the same container.
pub struct Container<R: Reactor> {
    shared: Arc<Shared<R>>,
}

struct Shared<R: Reactor> {
    reactor: Arc<R>,
    name: &'static str,
    config: RuntimeConfig,
    lifecycle: Lifecycle,
    /// Held by the thread currently driving the pipeline.
    turn: ReentrantMutex<()>,
    current: Mutex<R::State>,
    states: BehaviorSubject<R::State>,
    actions: PublishSubject<R::Action>,
    /// Actions dispatched before activation, replayed in order.
    pending: Mutex<VecDeque<R::Action>>,
    reductions: SerialQueue<Step<R::Mutation>>,
    /// Root of every internal subscription (transforms, mutate streams).
    pipeline: Subscription,
    termination: Mutex<Option<String>>,
}

impl<R: Reactor> Container<R> {
    pub fn new(reactor: R) -> Self {
        Self::with_config(reactor, RuntimeConfig::default())
    }

    pub fn with_config(reactor: R, config: RuntimeConfig) -> Self {
        let name = std::any::type_name::<R>();
        let initial = reactor.initial_state();
        tracing::debug!(reactor = name, "container created");
        Self {
            shared: Arc::new(Shared {
                reactor: Arc::new(reactor),
                name,
                config,
                lifecycle: Lifecycle::new(name),
                turn: ReentrantMutex::new(()),
                current: Mutex::new(initial.clone()),
                states: BehaviorSubject::new(initial),
                actions: PublishSubject::new(),
                pending: Mutex::new(VecDeque::new()),
                reductions: SerialQueue::new(),
                pipeline: Subscription::new(),
                termination: Mutex::new(None),
            }),
        }
    }

    pub fn reactor(&self) -> &R {
        &self.shared.reactor
    }

    /// Latest reduced state.
    ///
    /// Reflects every mutation reduced so far; after a dispatch whose
    /// mutations are produced synchronously it already holds the result.
    pub fn current_state(&self) -> R::State {
        self.shared.current_state()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lifecycle.phase()
    }

    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    /// Feed one action into the pipeline. Never blocks on `mutate`.
    ///
    /// Before the first state subscriber the action is buffered (see
    /// [`RuntimeConfig::max_pending_actions`]).
    pub fn dispatch(&self, action: R::Action) -> Result<(), ReactorError> {
        self.shared.dispatch(action)
    }

    /// Stream of states.
    ///
    /// Each subscriber first receives the latest state, then every state
    /// produced afterwards in reduction order. The first subscription
    /// activates the container: transforms are subscribed and buffered
    /// actions replayed after the initial state was delivered.
    pub fn observe_state(&self) -> Result<Observable<R::State>, ReactorError> {
        self.shared.ensure_usable()?;
        let shared = Arc::downgrade(&self.shared);
        Ok(Observable::create(move |sink| {
            let Some(shared) = shared.upgrade() else {
                sink.complete();
                return;
            };
            let _turn = shared.turn.lock();
            shared.states.observable().subscribe_sink(sink);
            shared.activate();
        }))
    }

    /// Cancel all internal subscriptions and complete the state stream.
    ///
    /// Mutations still in flight are discarded; later calls to `dispatch`
    /// and `observe_state` fail with [`ReactorError::Destroyed`].
    pub fn destroy(&self) {
        self.shared.destroy();
    }
}

impl<R: Reactor> Drop for Container<R> {
    fn drop(&mut self) {
        self.shared.destroy();
    }
}

impl<R: Reactor> Shared<R> {
    fn current_state(&self) -> R::State {
        self.current.lock().clone()
    }

    fn ensure_usable(&self) -> Result<(), ReactorError> {
        match self.lifecycle.phase() {
            Phase::Destroyed => Err(ReactorError::Destroyed {
                reactor: self.name,
            }),
            Phase::Terminated => Err(ReactorError::Terminated {
                reactor: self.name,
                reason: self
                    .termination
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
            Phase::Idle | Phase::Activating | Phase::Active => Ok(()),
        }
    }

    fn dispatch(&self, action: R::Action) -> Result<(), ReactorError> {
        let _turn = self.turn.lock();
        {
            let mut pending = self.pending.lock();
            match self.lifecycle.phase() {
                Phase::Idle => {
                    if pending.len() >= self.config.max_pending_actions {
                        pending.pop_front();
                        tracing::warn!(
                            reactor = self.name,
                            limit = self.config.max_pending_actions,
                            "pending action buffer full; dropped oldest action"
                        );
                    }
                    pending.push_back(action);
                    return Ok(());
                }
                Phase::Activating => {
                    pending.push_back(action);
                    return Ok(());
                }
                Phase::Active => {}
                Phase::Terminated | Phase::Destroyed => {
                    drop(pending);
                    return self.ensure_usable();
                }
            }
        }
        if self.config.trace_mutations {
            tracing::trace!(reactor = self.name, "action dispatched");
        }
        self.actions.on_next(action);
        Ok(())
    }

    fn activate(self: &Arc<Self>) {
        if !self.lifecycle.transition(Phase::Idle, Phase::Activating) {
            return;
        }

        let subscription = self.build_pipeline().subscribe({
            let shared = Arc::downgrade(self);
            move |event| {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let step = match event {
                    Event::Next(mutation) => Step::Reduce(mutation),
                    Event::Error(err) => Step::Finish(Some(err)),
                    Event::Completed => Step::Finish(None),
                };
                let _turn = shared.turn.lock();
                shared.enqueue(step);
            }
        });
        self.pipeline.attach(&subscription);

        // Dispatches arriving while flushing are appended to `pending`, so
        // replay keeps dispatch order until the switch to Active.
        let mut replayed = 0usize;
        loop {
            if self.lifecycle.phase().is_final() {
                break;
            }
            let next = {
                let mut pending = self.pending.lock();
                match pending.pop_front() {
                    Some(action) => action,
                    None => {
                        self.lifecycle.transition(Phase::Activating, Phase::Active);
                        break;
                    }
                }
            };
            replayed += 1;
            self.actions.on_next(next);
        }
        tracing::debug!(reactor = self.name, replayed, "container activated");
    }

    fn build_pipeline(self: &Arc<Self>) -> Observable<R::Mutation> {
        let reactor = Arc::clone(&self.reactor);
        let shared: Weak<Self> = Arc::downgrade(self);
        let name = self.name;

        let actions = Self::gated(
            &shared,
            reactor.transform_action(self.actions.observable()),
        );
        let mutate_reactor = Arc::clone(&reactor);
        let mutations = actions.flat_map(move |action| {
            let Some(snapshot) = shared.upgrade().map(|shared| shared.current_state()) else {
                return Observable::empty();
            };
            let mutations = mutate_reactor
                .mutate(&snapshot, action)
                .catch_error(move |err| {
                    tracing::warn!(reactor = name, error = %err, "mutate failed; action contributes no mutations");
                    Observable::empty()
                });
            Self::gated(&shared, mutations)
        });
        reactor.transform_mutation(mutations)
    }

    /// Deliver every event of `source` while holding the turn lock.
    ///
    /// Taken before the value reaches any merge queue of the pipeline, so a
    /// background producer and a dispatching thread never interleave.
    fn gated<T: Send + 'static>(shared: &Weak<Self>, source: Observable<T>) -> Observable<T> {
        let shared = shared.clone();
        Observable::create(move |sink: Sink<T>| {
            let shared = shared.clone();
            let downstream = sink.clone();
            source.subscribe_for(&sink, move |event| {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let _turn = shared.turn.lock();
                downstream.send(event);
            });
        })
    }

    fn enqueue(&self, step: Step<R::Mutation>) {
        self.reductions.push(step, |step| self.apply(step));
    }

    fn apply(&self, step: Step<R::Mutation>) {
        match step {
            Step::Reduce(mutation) => {
                if self.lifecycle.phase().is_final() {
                    return;
                }
                let next = {
                    let mut current = self.current.lock();
                    let next = <R as Reducer>::reduce(current.clone(), mutation);
                    *current = next.clone();
                    next
                };
                if self.config.trace_mutations {
                    tracing::trace!(reactor = self.name, "mutation reduced");
                }
                self.states.on_next(next);
            }
            Step::Finish(err) => {
                let reason = match &err {
                    Some(err) => err.to_string(),
                    None => "mutation stream completed".to_string(),
                };
                {
                    // Held across the phase change so a failing dispatch
                    // always finds the reason.
                    let mut termination = self.termination.lock();
                    if self.lifecycle.finish(Phase::Terminated).is_final() {
                        return;
                    }
                    *termination = Some(reason.clone());
                }
                self.pipeline.cancel();
                match err {
                    Some(err) => {
                        tracing::error!(reactor = self.name, error = %reason, "mutation stream failed; state stream terminated");
                        self.states.on_error(err);
                    }
                    None => {
                        tracing::debug!(reactor = self.name, "mutation stream completed; state stream terminated");
                        self.states.on_completed();
                    }
                }
            }
        }
    }

    fn destroy(&self) {
        let _turn = self.turn.lock();
        if self.lifecycle.finish(Phase::Destroyed).is_final() {
            return;
        }
        self.pipeline.cancel();
        self.pending.lock().clear();
        self.actions.on_completed();
        self.states.on_completed();
        tracing::debug!(reactor = self.name, "container destroyed");
    }
}
