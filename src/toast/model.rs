use std::time::Duration;

use uuid::Uuid;

use crate::config::ToastConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

impl ToastId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ToastId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Screen edge a toast slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastEdge {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Any,
    /// Only toward the edge the toast came from (up for `Top`).
    TowardEdge,
}

impl SwipeDirection {
    /// Whether a vertical drag of `delta` points may move the toast.
    /// Positive `delta` points down.
    pub fn permits(self, delta: f64, edge: ToastEdge) -> bool {
        match (self, edge) {
            (SwipeDirection::Any, _) => true,
            (SwipeDirection::TowardEdge, ToastEdge::Top) => delta <= 0.0,
            (SwipeDirection::TowardEdge, ToastEdge::Bottom) => delta >= 0.0,
        }
    }
}

/// Ways a toast may be closed by the user or by time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dismissable {
    Tap,
    LongPress,
    Time(Duration),
    Swipe(SwipeDirection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub title: String,
    pub edge: ToastEdge,
    pub dismissables: Vec<Dismissable>,
    /// Keep other visible toasts when this one shows.
    pub allow_overlap: bool,
}

impl Toast {
    /// Plain text toast: auto-closes after `display_time_ms`, swipe toward
    /// its edge to close early.
    pub fn text(title: impl Into<String>, config: &ToastConfig) -> Self {
        Self {
            id: ToastId::new(),
            title: title.into(),
            edge: ToastEdge::Top,
            dismissables: vec![
                Dismissable::Time(config.display_time()),
                Dismissable::Swipe(SwipeDirection::TowardEdge),
            ],
            allow_overlap: config.allow_overlap,
        }
    }

    pub fn with_edge(mut self, edge: ToastEdge) -> Self {
        self.edge = edge;
        self
    }

    pub fn with_dismissables(mut self, dismissables: Vec<Dismissable>) -> Self {
        self.dismissables = dismissables;
        self
    }

    pub fn with_overlap(mut self, allow_overlap: bool) -> Self {
        self.allow_overlap = allow_overlap;
        self
    }

    /// First `Time` dismissable, if any.
    pub fn display_time(&self) -> Option<Duration> {
        self.dismissables.iter().find_map(|d| match d {
            Dismissable::Time(duration) => Some(*duration),
            _ => None,
        })
    }

    pub fn closes_on_tap(&self) -> bool {
        self.dismissables.contains(&Dismissable::Tap)
    }

    pub fn closes_on_long_press(&self) -> bool {
        self.dismissables.contains(&Dismissable::LongPress)
    }

    pub fn is_swipeable(&self) -> bool {
        self.dismissables
            .iter()
            .any(|d| matches!(d, Dismissable::Swipe(_)))
    }

    /// True if some `Swipe` dismissable lets a drag of `delta` move the toast.
    pub fn permits_drag(&self, delta: f64) -> bool {
        self.dismissables.iter().any(|d| match d {
            Dismissable::Swipe(direction) => direction.permits(delta, self.edge),
            _ => false,
        })
    }
}
