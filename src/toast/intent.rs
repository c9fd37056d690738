use crate::mvi::Intent;

use super::model::{Toast, ToastId};

/// Presentation requests and gestures on a visible toast.
#[derive(Debug, Clone)]
pub enum ToastAction {
    Show(Toast),
    Tap(ToastId),
    LongPress(ToastId),
    PanBegan(ToastId),
    /// `delta` is the vertical translation since the pan began.
    PanChanged { id: ToastId, delta: f64 },
    PanEnded(ToastId),
    PanCancelled(ToastId),
    Close(ToastId),
}

impl Intent for ToastAction {}
