//! Shared reactors and helpers for integration tests.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use bibbi_reactor::bus::EventBus;
use bibbi_reactor::mvi::{Intent, Reactor, Reducer, UiState};
use bibbi_reactor::stream::{Event, Observable, StreamError, Subscription};
use parking_lot::Mutex;

pub const MAX_NICKNAME_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Account sign-up screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignUpState {
    pub nickname: String,
    pub is_valid_nickname: bool,
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl UiState for SignUpState {}

#[derive(Debug, Clone)]
pub enum SignUpAction {
    SetNickname(String),
    SetYear(u32),
    SetMonth(u32),
    SetDay(u32),
    /// Resolves to no mutations.
    Ignore,
    /// `mutate` fails for this action.
    Broken,
}

impl Intent for SignUpAction {}

#[derive(Debug, Clone)]
pub enum SignUpMutation {
    SetNickname(String),
    SetYear(u32),
    SetMonth(u32),
    SetDay(u32),
}

pub struct SignUpReactor;

impl Reducer for SignUpReactor {
    type State = SignUpState;
    type Mutation = SignUpMutation;

    fn reduce(mut state: SignUpState, mutation: SignUpMutation) -> SignUpState {
        match mutation {
            SignUpMutation::SetNickname(nickname) => {
                state.is_valid_nickname = nickname.chars().count() <= MAX_NICKNAME_LEN;
                state.nickname = nickname;
            }
            SignUpMutation::SetYear(year) => state.year = Some(year),
            SignUpMutation::SetMonth(month) => state.month = Some(month),
            SignUpMutation::SetDay(day) => state.day = Some(day),
        }
        state
    }
}

impl Reactor for SignUpReactor {
    type Action = SignUpAction;

    fn initial_state(&self) -> SignUpState {
        SignUpState::default()
    }

    fn mutate(&self, _state: &SignUpState, action: SignUpAction) -> Observable<SignUpMutation> {
        match action {
            SignUpAction::SetNickname(nickname) => {
                Observable::just(SignUpMutation::SetNickname(nickname))
            }
            SignUpAction::SetYear(year) => Observable::just(SignUpMutation::SetYear(year)),
            SignUpAction::SetMonth(month) => Observable::just(SignUpMutation::SetMonth(month)),
            SignUpAction::SetDay(day) => Observable::just(SignUpMutation::SetDay(day)),
            SignUpAction::Ignore => Observable::empty(),
            SignUpAction::Broken => Observable::error(StreamError::msg("validation backend down")),
        }
    }
}

// ---------------------------------------------------------------------------
// Feed screen: delayed fetches plus notices merged from an event bus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedState {
    pub posts: Vec<String>,
    pub notices: Vec<String>,
}

impl UiState for FeedState {}

#[derive(Debug, Clone)]
pub enum FeedAction {
    /// Append `post` after `delay`.
    Fetch { post: String, delay: Duration },
}

impl Intent for FeedAction {}

#[derive(Debug, Clone)]
pub enum FeedMutation {
    Append(String),
    Notice(String),
}

pub struct FeedReactor {
    pub notices: EventBus<String>,
}

impl Reducer for FeedReactor {
    type State = FeedState;
    type Mutation = FeedMutation;

    fn reduce(mut state: FeedState, mutation: FeedMutation) -> FeedState {
        match mutation {
            FeedMutation::Append(post) => state.posts.push(post),
            FeedMutation::Notice(notice) => state.notices.push(notice),
        }
        state
    }
}

impl Reactor for FeedReactor {
    type Action = FeedAction;

    fn initial_state(&self) -> FeedState {
        FeedState::default()
    }

    fn mutate(&self, _state: &FeedState, action: FeedAction) -> Observable<FeedMutation> {
        match action {
            FeedAction::Fetch { post, delay } => Observable::from_future(move || {
                let post = post.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    FeedMutation::Append(post)
                }
            }),
        }
    }

    fn transform_mutation(&self, mutation: Observable<FeedMutation>) -> Observable<FeedMutation> {
        mutation.merge_with(&self.notices.events().map(FeedMutation::Notice))
    }
}

// ---------------------------------------------------------------------------
// Tally: synchronous and background increments of one counter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tally(pub i64);

impl UiState for Tally {}

#[derive(Debug, Clone)]
pub enum TallyAction {
    /// Add immediately.
    Now(i64),
    /// Add after `delay` from a spawned task.
    Later(i64, Duration),
}

impl Intent for TallyAction {}

pub struct TallyReactor;

impl Reducer for TallyReactor {
    type State = Tally;
    type Mutation = i64;

    fn reduce(state: Tally, amount: i64) -> Tally {
        Tally(state.0 + amount)
    }
}

impl Reactor for TallyReactor {
    type Action = TallyAction;

    fn initial_state(&self) -> Tally {
        Tally(0)
    }

    fn mutate(&self, _state: &Tally, action: TallyAction) -> Observable<i64> {
        match action {
            TallyAction::Now(amount) => Observable::just(amount),
            TallyAction::Later(amount, delay) => Observable::from_future(move || async move {
                tokio::time::sleep(delay).await;
                amount
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Records every event of an observable.
pub struct Recorder<T> {
    events: Arc<Mutex<Vec<Event<T>>>>,
    pub subscription: Subscription,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn attach(observable: &Observable<T>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscription = observable.subscribe({
            let events = Arc::clone(&events);
            move |event| events.lock().push(event)
        });
        Self {
            events,
            subscription,
        }
    }

    pub fn values(&self) -> Vec<T> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.events
            .lock()
            .iter()
            .any(|event| matches!(event, Event::Completed))
    }

    pub fn error(&self) -> Option<StreamError> {
        self.events.lock().iter().find_map(|event| match event {
            Event::Error(err) => Some(err.clone()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

/// Let spawned tasks run after the paused clock was advanced.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
