//! Responsive layout classes
//!
//! The navigator only distinguishes two coarse layouts. Screens narrower than
//! the wide breakpoint render a single linear stack, wider screens may mount a
//! master and a detail screen side by side.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Breakpoint Tokens
// =============================================================================

/// Breakpoint widths
pub mod breakpoints {
    /// Mobile breakpoint (800px), the default narrow/wide threshold
    pub const MOBILE: u32 = 800;

    /// Check if a width renders the wide layout for the given breakpoint
    pub fn is_wide(width: u32, breakpoint: u32) -> bool {
        width >= breakpoint
    }
}

// =============================================================================
// Layout Class
// =============================================================================

/// Coarse responsive mode driving navigation reshaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutClass {
    /// Single column; every screen is a stack member
    #[default]
    Narrow,
    /// Multi column; master/detail screens may be mounted as siblings
    Wide,
}

impl LayoutClass {
    /// Classify a window width against a breakpoint
    pub fn from_width(width: u32, breakpoint: u32) -> Self {
        if breakpoints::is_wide(width, breakpoint) {
            LayoutClass::Wide
        } else {
            LayoutClass::Narrow
        }
    }

    /// Whether this is the narrow layout
    pub fn is_narrow(self) -> bool {
        self == LayoutClass::Narrow
    }
}

impl fmt::Display for LayoutClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutClass::Narrow => write!(f, "narrow"),
            LayoutClass::Wide => write!(f, "wide"),
        }
    }
}
