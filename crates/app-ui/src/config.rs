//! Navigator configuration
//!
//! Settings for the responsive stack navigator. All fields have defaults, so a
//! partial JSON document is enough to override a single knob.

use crate::layout::breakpoints;
use crate::navigation::{NavigationError, Result, RouteParams};
use serde::{Deserialize, Serialize};

/// Default broadcast capacity for state change events
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// How route entry keys are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrategy {
    /// `name-<uuid v4>`
    #[default]
    Uuid,
    /// `name-<counter>`, deterministic within a process
    Sequential,
}

/// Route names playing the master and detail roles of a wide split view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Routes that render as the list pane
    pub master_routes: Vec<String>,
    /// Routes that render as the detail pane beside a master
    pub detail_routes: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            master_routes: vec!["Home".to_string()],
            detail_routes: vec!["Report".to_string()],
        }
    }
}

/// Responsive stack navigator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Route seeded as the stack root on mount
    pub initial_route: String,
    /// Params for the root entry
    pub initial_params: RouteParams,
    /// Route name given to the search entry
    pub search_route: String,
    /// Windows at least this wide use the wide layout
    pub wide_breakpoint: u32,
    /// Master/detail roles used when reshaping between layouts
    pub split: SplitConfig,
    /// Key generation strategy
    pub keys: KeyStrategy,
    /// Number of state change events buffered for slow subscribers
    pub event_buffer: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            initial_route: "Home".to_string(),
            initial_params: RouteParams::new(),
            search_route: "Search".to_string(),
            wide_breakpoint: breakpoints::MOBILE,
            split: SplitConfig::default(),
            keys: KeyStrategy::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl NavigatorConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the initial route
    pub fn initial_route(mut self, name: impl Into<String>, params: RouteParams) -> Self {
        self.initial_route = name.into();
        self.initial_params = params;
        self
    }

    /// Set the search route name
    pub fn search_route(mut self, name: impl Into<String>) -> Self {
        self.search_route = name.into();
        self
    }

    /// Set the wide breakpoint
    pub fn wide_breakpoint(mut self, width: u32) -> Self {
        self.wide_breakpoint = width;
        self
    }

    /// Set the master/detail route roles
    pub fn split<M, D>(mut self, master_routes: M, detail_routes: D) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        self.split = SplitConfig {
            master_routes: master_routes.into_iter().map(Into::into).collect(),
            detail_routes: detail_routes.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Set the key strategy
    pub fn keys(mut self, strategy: KeyStrategy) -> Self {
        self.keys = strategy;
        self
    }

    /// Set the event buffer size
    pub fn event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }

    /// Check the configuration for contradictions
    pub fn validate(&self) -> Result<()> {
        if self.initial_route.is_empty() {
            return Err(invalid("initial_route must not be empty"));
        }
        if self.search_route.is_empty() {
            return Err(invalid("search_route must not be empty"));
        }
        if self.search_route == self.initial_route {
            return Err(invalid("search_route must differ from initial_route"));
        }
        if self.wide_breakpoint == 0 {
            return Err(invalid("wide_breakpoint must be positive"));
        }
        if self.event_buffer == 0 {
            return Err(invalid("event_buffer must be positive"));
        }
        if let Some(both) = self
            .split
            .master_routes
            .iter()
            .find(|name| self.split.detail_routes.contains(name))
        {
            return Err(invalid(format!(
                "route {both} cannot be both a master and a detail route"
            )));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> NavigationError {
    NavigationError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NavigatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_route, "Home");
        assert_eq!(config.search_route, "Search");
        assert_eq!(config.wide_breakpoint, 800);
        assert_eq!(config.keys, KeyStrategy::Uuid);
    }

    #[test]
    fn test_partial_json() {
        let config =
            NavigatorConfig::from_json_str(r#"{"wide_breakpoint": 1024, "keys": "sequential"}"#)
                .unwrap();
        assert_eq!(config.wide_breakpoint, 1024);
        assert_eq!(config.keys, KeyStrategy::Sequential);
        assert_eq!(config.initial_route, "Home");
        assert_eq!(config.split, SplitConfig::default());
    }

    #[test]
    fn test_malformed_json() {
        let err = NavigatorConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, NavigationError::Serialization(_)));
    }

    #[test]
    fn test_overlapping_roles_rejected() {
        let config = NavigatorConfig::new().split(["Inbox"], ["Inbox", "Chat"]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, NavigationError::InvalidConfig(_)));
    }

    #[test]
    fn test_search_route_must_differ() {
        let config = NavigatorConfig::new().search_route("Home");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(NavigatorConfig::new().event_buffer(0).validate().is_err());
        assert!(NavigatorConfig::new().wide_breakpoint(0).validate().is_err());
        assert!(
            NavigatorConfig::new()
                .initial_route("", RouteParams::new())
                .validate()
                .is_err()
        );
    }
}
