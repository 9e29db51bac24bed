//! Responsive stack navigation
//!
//! This module composes a generic stack navigator with search and layout
//! awareness:
//! - [`route_state`] - the route stack plus the optional search entry
//! - [`router`] - pure state transitions for every navigation action
//! - [`search_route`] - where (if anywhere) the search UI is mounted
//! - [`state_with_search`] - publishes composed state to subscribers
//! - [`layout_effect`] - keeps pane roles in line with the layout class
//! - [`navigator`] - wires everything onto an external stack engine
//!
//! # Example
//!
//! ```rust
//! use app_ui::config::NavigatorConfig;
//! use app_ui::layout::LayoutClass;
//! use app_ui::navigation::{
//!     create_responsive_stack_navigator, Action, RecordingEngine, RenderPlan, RouteParams,
//! };
//!
//! let config = NavigatorConfig::new().split(["Inbox"], ["Chat"]);
//! let mut nav = create_responsive_stack_navigator(config, RecordingEngine::default()).unwrap();
//! nav.mount(LayoutClass::Narrow).unwrap();
//!
//! nav.dispatch(Action::push("Inbox", RouteParams::new())).unwrap();
//! nav.dispatch(Action::open_search(RouteParams::new())).unwrap();
//! assert_eq!(nav.render_plan(), RenderPlan::Overlay);
//!
//! // Back closes search before touching the stack
//! nav.go_back().unwrap();
//! assert_eq!(nav.render_plan(), RenderPlan::None);
//! assert_eq!(nav.state().unwrap().depth(), 2);
//! ```

use thiserror::Error;

pub mod keys;
pub mod layout_effect;
pub mod navigator;
pub mod route_state;
pub mod router;
pub mod search_route;
pub mod state_with_search;

pub use keys::{KeyGenerator, SequentialKeys, UuidKeys};
pub use layout_effect::{LayoutChangeEffect, ReshapePolicy};
pub use navigator::{
    create_responsive_stack_navigator, DispatchFailure, Dispatcher, NavigatorExtensions,
    RecordingEngine, ResponsiveStackNavigator, StackEngine, DEFAULT_RECORDING_LIMIT,
};
pub use route_state::{into_params, Pane, RouteEntry, RouteParams, RouteState};
pub use router::{Action, ActionKind, CustomRouter, InitialStateOptions};
pub use search_route::{RenderPlan, SearchRouteRenderer};
pub use state_with_search::{ChangeCause, StateChange, StateWithSearch};

/// Navigation errors
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Action dispatched before the navigator was mounted, or targeting an
    /// entry that does not exist
    #[error("Invalid navigation action: {0}")]
    InvalidAction(String),

    /// Attempt to pop the last remaining stack entry
    #[error("Cannot pop the root of the navigation stack")]
    CannotPopRoot,

    /// Reset with zero entries
    #[error("Cannot reset the navigation stack to zero entries")]
    EmptyReset,

    /// A freshly generated key is already live
    #[error("Generated route key collides with a live entry: {0}")]
    KeyCollision(String),

    /// A reset stack repeats a key
    #[error("Duplicate route key in reset: {0}")]
    DuplicateResetKey(String),

    /// Configuration error
    #[error("Invalid navigator configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
