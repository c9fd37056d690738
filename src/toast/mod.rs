//! Toast presentation queue.
//!
//! Non-visual policy of the toast component: which toasts are visible,
//! how gestures and auto-close timers dismiss them. Rendering and
//! animation belong to the UI layer.

mod intent;
mod model;
mod reactor;
mod reducer;
mod state;

pub use intent::ToastAction;
pub use model::{Dismissable, SwipeDirection, Toast, ToastEdge, ToastId};
pub use reactor::ToastReactor;
pub use reducer::{ToastMutation, ToastReducer};
pub use state::{ActiveToast, ToastState};
