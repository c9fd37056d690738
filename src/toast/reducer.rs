use crate::mvi::Reducer;

use super::model::{Toast, ToastId};
use super::state::{ActiveToast, ToastState};

#[derive(Debug, Clone)]
pub enum ToastMutation {
    /// Show `toast` with its auto-close armed under `epoch`.
    Present { toast: Toast, epoch: u64 },
    Dismiss(ToastId),
    /// Start a pan; timers armed under older epochs become stale.
    BeginDrag { id: ToastId, epoch: u64 },
    Drag { id: ToastId, offset: f64 },
    ResetDrag(ToastId),
    /// Auto-close fired for the timer armed under `epoch`.
    Expire { id: ToastId, epoch: u64 },
}

pub struct ToastReducer;

impl Reducer for ToastReducer {
    type State = ToastState;
    type Mutation = ToastMutation;

    fn reduce(mut state: Self::State, mutation: Self::Mutation) -> Self::State {
        match mutation {
            ToastMutation::Present { toast, epoch } => {
                if !toast.allow_overlap {
                    state.visible.clear();
                }
                state.visible.push(ActiveToast {
                    toast,
                    offset: 0.0,
                    dragging: false,
                    timer_epoch: epoch,
                });
            }
            ToastMutation::Dismiss(id) => state.visible.retain(|active| active.toast.id != id),
            ToastMutation::Expire { id, epoch } => state
                .visible
                .retain(|active| active.toast.id != id || active.dragging || active.timer_epoch != epoch),
            ToastMutation::BeginDrag { id, epoch } => {
                if let Some(active) = find_mut(&mut state, id) {
                    active.dragging = true;
                    active.timer_epoch = epoch;
                }
            }
            ToastMutation::Drag { id, offset } => {
                if let Some(active) = find_mut(&mut state, id) {
                    active.offset = offset;
                }
            }
            ToastMutation::ResetDrag(id) => {
                if let Some(active) = find_mut(&mut state, id) {
                    active.offset = 0.0;
                    active.dragging = false;
                }
            }
        }
        state
    }
}

fn find_mut(state: &mut ToastState, id: ToastId) -> Option<&mut ActiveToast> {
    state.visible.iter_mut().find(|active| active.toast.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToastConfig;

    fn toast() -> Toast {
        Toast::text("hello", &ToastConfig::default())
    }

    #[test]
    fn present_without_overlap_replaces_visible() {
        let first = toast();
        let second = toast();
        let state = ToastReducer::reduce(ToastState::default(), ToastMutation::Present { toast: first.clone(), epoch: 0 });
        let state = ToastReducer::reduce(state, ToastMutation::Present { toast: second.clone(), epoch: 1 });
        assert!(!state.is_visible(first.id));
        assert!(state.is_visible(second.id));
    }

    #[test]
    fn present_with_overlap_stacks() {
        let first = toast();
        let second = toast().with_overlap(true);
        let state = ToastReducer::reduce(ToastState::default(), ToastMutation::Present { toast: first.clone(), epoch: 0 });
        let state = ToastReducer::reduce(state, ToastMutation::Present { toast: second.clone(), epoch: 1 });
        assert_eq!(state.visible.len(), 2);
    }

    #[test]
    fn stale_expire_is_ignored() {
        let t = toast();
        let id = t.id;
        let mut state = ToastReducer::reduce(ToastState::default(), ToastMutation::Present { toast: t, epoch: 0 });
        state = ToastReducer::reduce(state, ToastMutation::BeginDrag { id, epoch: 1 });
        state = ToastReducer::reduce(state, ToastMutation::ResetDrag(id));
        state = ToastReducer::reduce(state, ToastMutation::Expire { id, epoch: 0 });
        assert!(state.is_visible(id));

        state = ToastReducer::reduce(state, ToastMutation::Expire { id, epoch: 1 });
        assert!(!state.is_visible(id));
    }

    #[test]
    fn expire_waits_while_dragging() {
        let t = toast();
        let id = t.id;
        let mut state = ToastReducer::reduce(ToastState::default(), ToastMutation::Present { toast: t, epoch: 0 });
        state = ToastReducer::reduce(state, ToastMutation::BeginDrag { id, epoch: 1 });
        state = ToastReducer::reduce(state, ToastMutation::Expire { id, epoch: 1 });
        assert!(state.is_visible(id));
        assert!(state.get(id).is_some_and(|active| active.dragging));
    }

    #[test]
    fn reshown_toast_ignores_expiry_of_earlier_showing() {
        let t = toast();
        let id = t.id;
        let mut state = ToastReducer::reduce(
            ToastState::default(),
            ToastMutation::Present { toast: t.clone(), epoch: 3 },
        );
        state = ToastReducer::reduce(state, ToastMutation::Dismiss(id));
        state = ToastReducer::reduce(state, ToastMutation::Present { toast: t, epoch: 4 });

        state = ToastReducer::reduce(state, ToastMutation::Expire { id, epoch: 3 });
        assert!(state.is_visible(id));
        state = ToastReducer::reduce(state, ToastMutation::Expire { id, epoch: 4 });
        assert!(!state.is_visible(id));
    }
}
