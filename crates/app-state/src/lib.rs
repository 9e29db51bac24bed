//! Application state management for the chat workspace
//!
//! This crate provides the observable stores the presentation layer
//! subscribes to.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::{StateStore, StoreError, Versioned};
