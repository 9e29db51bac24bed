//! Chat workspace presentation layer
//!
//! Umbrella crate tying together the UI navigation core and the observable
//! state stores it publishes through.

pub use app_state;
pub use app_ui;
