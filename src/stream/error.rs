//! Terminal error carried by event streams.

use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// Error delivered as the terminal `Event::Error` of a stream.
///
/// Cheap to clone so a subject can hand the same failure to every
/// subscriber.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Free-form failure description.
    #[error("{0}")]
    Message(String),

    /// Failure produced by an underlying collaborator (network, use-case).
    #[error("{0}")]
    Source(Arc<dyn Error + Send + Sync>),

    /// A time-based or async operator was subscribed outside a tokio runtime.
    #[error("no tokio runtime available to drive '{operator}'")]
    NoRuntime { operator: &'static str },
}

impl StreamError {
    pub fn msg(message: impl Into<String>) -> Self {
        StreamError::Message(message.into())
    }

    pub fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        StreamError::Source(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_displays_verbatim() {
        assert_eq!(StreamError::msg("boom").to_string(), "boom");
    }

    #[test]
    fn source_displays_inner_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "request timed out");
        let err = StreamError::from_error(io);
        assert_eq!(err.to_string(), "request timed out");
    }

    #[test]
    fn no_runtime_names_operator() {
        let err = StreamError::NoRuntime { operator: "debounce" };
        assert!(err.to_string().contains("debounce"));
    }
}
