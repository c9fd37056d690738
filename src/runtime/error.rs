use thiserror::Error;

/// Misuse of a container, reported to the caller instead of being ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactorError {
    /// The owning screen tore the container down.
    #[error("container for '{reactor}' has been destroyed")]
    Destroyed { reactor: &'static str },

    /// The merged mutation stream ended; no state will follow.
    #[error("state stream of '{reactor}' has terminated: {reason}")]
    Terminated { reactor: &'static str, reason: String },
}
