//! User interface navigation for the chat workspace
//!
//! This crate provides the responsive stack navigator used by the
//! presentation layer: a route stack with a search overlay that adapts to the
//! device's layout class.
//!
//! # Modules
//!
//! - [`navigation`] - Router, state composition, layout reshaping and the
//!   navigator composition root
//! - [`layout`] - Breakpoints and layout classes
//! - [`config`] - Navigator configuration
//!
//! # Example
//!
//! ```rust
//! use app_ui::{create_responsive_stack_navigator, Action, LayoutClass, NavigatorConfig};
//! use app_ui::navigation::{RecordingEngine, RouteParams};
//!
//! let mut nav =
//!     create_responsive_stack_navigator(NavigatorConfig::default(), RecordingEngine::default())
//!         .unwrap();
//! nav.mount(LayoutClass::Wide).unwrap();
//! nav.dispatch(Action::push("Report", RouteParams::new())).unwrap();
//! assert_eq!(nav.state().unwrap().route_names(), vec!["Home", "Report"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod layout;
pub mod navigation;

// Re-export commonly used types
pub use config::{KeyStrategy, NavigatorConfig, SplitConfig};

pub use layout::{breakpoints, LayoutClass};

pub use navigation::{
    create_responsive_stack_navigator, Action, ActionKind, ChangeCause, CustomRouter,
    Dispatcher, LayoutChangeEffect, NavigationError, Pane, RenderPlan, ResponsiveStackNavigator,
    RouteEntry, RouteParams, RouteState, SearchRouteRenderer, StackEngine, StateChange,
    StateWithSearch,
};
