use crate::mvi::UiState;

use super::model::{Toast, ToastId};

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveToast {
    pub toast: Toast,
    /// Current vertical drag offset in points.
    pub offset: f64,
    pub dragging: bool,
    /// Epoch of the auto-close timer that may close this toast. Each showing
    /// and each pan gets a fresh one; timers armed under any other epoch are
    /// stale.
    pub timer_epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToastState {
    /// Visible toasts, oldest first.
    pub visible: Vec<ActiveToast>,
}

impl UiState for ToastState {}

impl ToastState {
    pub fn get(&self, id: ToastId) -> Option<&ActiveToast> {
        self.visible.iter().find(|active| active.toast.id == id)
    }

    pub fn is_visible(&self, id: ToastId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
