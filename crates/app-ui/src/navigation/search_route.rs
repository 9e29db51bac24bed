//! Search route placement
//!
//! Classifies where the search UI belongs for a given state. Actual mounting
//! is left to the stack engine.

use super::route_state::RouteState;
use crate::layout::LayoutClass;
use serde::{Deserialize, Serialize};

/// Where the search entry is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderPlan {
    /// Search is closed
    #[default]
    None,
    /// Full-screen above the stack
    Overlay,
    /// Beside the stack, which stays interactive
    SidePane,
}

impl RenderPlan {
    /// Whether the search UI is mounted at all
    pub fn is_visible(self) -> bool {
        self != RenderPlan::None
    }

    /// Whether the stack underneath can still receive input
    pub fn stack_interactive(self) -> bool {
        self != RenderPlan::Overlay
    }
}

/// Extra-content renderer for the search route
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchRouteRenderer;

impl SearchRouteRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }

    /// Decide the render plan for a state
    pub fn decide(&self, state: &RouteState) -> RenderPlan {
        match (state.search_entry(), state.layout_class()) {
            (None, _) => RenderPlan::None,
            (Some(_), LayoutClass::Narrow) => RenderPlan::Overlay,
            (Some(_), LayoutClass::Wide) => RenderPlan::SidePane,
        }
    }
}
