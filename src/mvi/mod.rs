//! Model-View-Intent (MVI) reactor primitives.
//!
//! This module provides the traits a screen implements to plug into the
//! unidirectional data flow run by [`Container`](crate::runtime::Container).
//!
//! # Architecture
//!
//! ```text
//! Action ──→ mutate ──→ Mutation ──→ reduce ──→ State ──→ View
//!    ↑          ↑            ↑                             │
//!    │   transform_action  transform_mutation              │
//!    └─────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: Immutable-per-version snapshot of a screen
//! - **Intent**: User actions or system events
//! - **Reducer**: Pure function applying mutations to state
//! - **Reactor**: Reducer plus the async `mutate` stage and transforms

mod intent;
mod reactor;
mod reducer;
mod state;

pub use intent::Intent;
pub use reactor::Reactor;
pub use reducer::Reducer;
pub use state::UiState;
