//! State container runtime.

mod container;
mod error;
mod lifecycle;

pub use container::Container;
pub use error::ReactorError;
pub use lifecycle::Phase;
