use super::error::StreamError;

/// A single notification delivered to an observer.
///
/// `Error` and `Completed` are terminal: nothing follows them on the same
/// subscription.
#[derive(Debug, Clone)]
pub enum Event<T> {
    Next(T),
    Error(StreamError),
    Completed,
}

impl<T> Event<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Next(_))
    }
}
