use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::bus::EventBus;
use crate::config::ToastConfig;
use crate::mvi::{Reactor, Reducer};
use crate::stream::Observable;

use super::intent::ToastAction;
use super::model::{Toast, ToastId};
use super::reducer::{ToastMutation, ToastReducer};
use super::state::ToastState;

/// Presentation policy for toasts.
///
/// Run it in a [`Container`](crate::runtime::Container) and render
/// [`ToastState::visible`]. Toasts published on the injected bus are shown
/// as if dispatched with [`ToastAction::Show`].
pub struct ToastReactor {
    config: ToastConfig,
    bus: Option<EventBus<Toast>>,
    /// Source of auto-close epochs, unique per showing and per pan.
    epochs: AtomicU64,
}

impl ToastReactor {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            config,
            bus: None,
            epochs: AtomicU64::new(0),
        }
    }

    pub fn with_bus(mut self, bus: EventBus<Toast>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn config(&self) -> &ToastConfig {
        &self.config
    }

    fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::Relaxed)
    }

    /// Snap back and arm a fresh auto-close under the toast's current epoch.
    fn settle(&self, state: &ToastState, id: ToastId) -> Observable<ToastMutation> {
        let Some(active) = state.get(id) else {
            return Observable::empty();
        };
        let reset = Observable::just(ToastMutation::ResetDrag(id));
        match active.toast.display_time() {
            Some(delay) => reset.concat_with(&auto_close(id, active.timer_epoch, delay)),
            None => reset,
        }
    }
}

fn auto_close(id: ToastId, epoch: u64, delay: Duration) -> Observable<ToastMutation> {
    Observable::from_future(move || async move {
        tokio::time::sleep(delay).await;
        ToastMutation::Expire { id, epoch }
    })
}

impl Reducer for ToastReactor {
    type State = ToastState;
    type Mutation = ToastMutation;

    fn reduce(state: Self::State, mutation: Self::Mutation) -> Self::State {
        ToastReducer::reduce(state, mutation)
    }
}

impl Reactor for ToastReactor {
    type Action = ToastAction;

    fn initial_state(&self) -> ToastState {
        ToastState::default()
    }

    fn mutate(&self, state: &ToastState, action: ToastAction) -> Observable<ToastMutation> {
        match action {
            ToastAction::Show(toast) => {
                if state.is_visible(toast.id) {
                    return Observable::empty();
                }
                tracing::debug!(toast = %toast.id, title = %toast.title, "showing toast");
                let id = toast.id;
                let delay = toast.display_time();
                let epoch = self.next_epoch();
                let present = Observable::just(ToastMutation::Present { toast, epoch });
                match delay {
                    Some(delay) => present.concat_with(&auto_close(id, epoch, delay)),
                    None => present,
                }
            }
            ToastAction::Tap(id) => match state.get(id) {
                Some(active) if active.toast.closes_on_tap() => {
                    Observable::just(ToastMutation::Dismiss(id))
                }
                _ => Observable::empty(),
            },
            ToastAction::LongPress(id) => match state.get(id) {
                Some(active) if active.toast.closes_on_long_press() => {
                    Observable::just(ToastMutation::Dismiss(id))
                }
                _ => Observable::empty(),
            },
            ToastAction::PanBegan(id) => match state.get(id) {
                Some(active) if active.toast.is_swipeable() => {
                    Observable::just(ToastMutation::BeginDrag {
                        id,
                        epoch: self.next_epoch(),
                    })
                }
                _ => Observable::empty(),
            },
            ToastAction::PanChanged { id, delta } => match state.get(id) {
                Some(active) if active.dragging && active.toast.permits_drag(delta) => {
                    Observable::just(ToastMutation::Drag { id, offset: delta })
                }
                _ => Observable::empty(),
            },
            ToastAction::PanEnded(id) => match state.get(id) {
                Some(active) if active.dragging => {
                    if active.offset.abs() > self.config.swipe_threshold {
                        Observable::just(ToastMutation::Dismiss(id))
                    } else {
                        self.settle(state, id)
                    }
                }
                _ => Observable::empty(),
            },
            ToastAction::PanCancelled(id) => match state.get(id) {
                Some(active) if active.dragging => self.settle(state, id),
                _ => Observable::empty(),
            },
            ToastAction::Close(id) => {
                if state.is_visible(id) {
                    Observable::just(ToastMutation::Dismiss(id))
                } else {
                    Observable::empty()
                }
            }
        }
    }

    fn transform_action(&self, action: Observable<ToastAction>) -> Observable<ToastAction> {
        match &self.bus {
            Some(bus) => action.merge_with(&bus.events().map(ToastAction::Show)),
            None => action,
        }
    }
}
