//! Unidirectional Action → Mutation → State containers for Bibbi screens.
//!
//! A screen implements [`mvi::Reactor`]; a [`runtime::Container`] runs it,
//! serializing reductions and publishing states through the push-based
//! [`stream`] primitive.

pub mod bus;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod runtime;
pub mod stream;
pub mod toast;
