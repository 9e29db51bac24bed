//! Route stack data model
//!
//! A [`RouteState`] is an immutable value: every navigation action produces a
//! new state instead of mutating the previous one, which keeps old versions
//! usable for diffing and back-navigation replay.

use super::{NavigationError, Result};
use crate::layout::LayoutClass;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parameters for a route entry
pub type RouteParams = serde_json::Map<String, serde_json::Value>;

/// Convert a JSON value into route params
///
/// Objects map directly, `null` becomes empty params and any other value is
/// stored under a single `value` key.
pub fn into_params(value: serde_json::Value) -> RouteParams {
    match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => RouteParams::new(),
        other => {
            let mut params = RouteParams::new();
            params.insert("value".to_string(), other);
            params
        }
    }
}

/// Where an entry is mounted in a wide layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pane {
    /// Ordinary full-width stack member
    #[default]
    Full,
    /// List half of a side-by-side pair
    Master,
    /// Detail half of a side-by-side pair
    Detail,
}

/// One screen instance on the navigation stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Unique key, stable for the entry's lifetime
    pub key: String,
    /// Logical route name
    pub name: String,
    /// Screen-specific params
    #[serde(default)]
    pub params: RouteParams,
    /// Pane role in wide layouts
    #[serde(default)]
    pub pane: Pane,
}

impl RouteEntry {
    /// Create a full-width entry
    pub fn new(key: impl Into<String>, name: impl Into<String>, params: RouteParams) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            params,
            pane: Pane::Full,
        }
    }

    /// Same entry with a different pane role
    pub fn with_pane(mut self, pane: Pane) -> Self {
        self.pane = pane;
        self
    }

    /// Same entry with params merged over the existing ones
    pub fn with_merged_params(mut self, params: RouteParams) -> Self {
        self.params.extend(params);
        self
    }

    /// Look up a param
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }
}

/// Composed navigation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRouteState")]
pub struct RouteState {
    stack: Vec<RouteEntry>,
    search_entry: Option<RouteEntry>,
    layout_class: LayoutClass,
}

#[derive(Deserialize)]
struct RawRouteState {
    stack: Vec<RouteEntry>,
    #[serde(default)]
    search_entry: Option<RouteEntry>,
    #[serde(default)]
    layout_class: LayoutClass,
}

impl TryFrom<RawRouteState> for RouteState {
    type Error = NavigationError;

    fn try_from(raw: RawRouteState) -> Result<Self> {
        RouteState::new(raw.stack, raw.search_entry, raw.layout_class)
    }
}

impl RouteState {
    /// Build a state, checking that the stack is non-empty and that every
    /// key, including the search entry's, is unique
    pub fn new(
        stack: Vec<RouteEntry>,
        search_entry: Option<RouteEntry>,
        layout_class: LayoutClass,
    ) -> Result<Self> {
        if stack.is_empty() {
            return Err(NavigationError::EmptyReset);
        }

        let mut seen = HashSet::with_capacity(stack.len() + 1);
        for entry in stack.iter().chain(search_entry.iter()) {
            if !seen.insert(entry.key.as_str()) {
                return Err(NavigationError::DuplicateResetKey(entry.key.clone()));
            }
        }

        Ok(Self {
            stack,
            search_entry,
            layout_class,
        })
    }

    /// Ordered stack, root first
    pub fn stack(&self) -> &[RouteEntry] {
        &self.stack
    }

    /// Root entry
    pub fn root(&self) -> &RouteEntry {
        // `new` rejects empty stacks and transitions never remove the root
        &self.stack[0]
    }

    /// Active (top) entry
    pub fn top(&self) -> &RouteEntry {
        &self.stack[self.stack.len() - 1]
    }

    /// Stack depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Search entry, present while search is open
    pub fn search_entry(&self) -> Option<&RouteEntry> {
        self.search_entry.as_ref()
    }

    /// Whether the search overlay is open
    pub fn is_search_open(&self) -> bool {
        self.search_entry.is_some()
    }

    /// Layout the state was last computed under
    pub fn layout_class(&self) -> LayoutClass {
        self.layout_class
    }

    /// Every live key, stack first then search
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stack
            .iter()
            .chain(self.search_entry.iter())
            .map(|entry| entry.key.as_str())
    }

    /// Whether a key is live anywhere in this state
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys().any(|live| live == key)
    }

    /// Find a stack entry by key
    pub fn entry(&self, key: &str) -> Option<&RouteEntry> {
        self.stack.iter().find(|entry| entry.key == key)
    }

    /// Route names of the stack, root first
    pub fn route_names(&self) -> Vec<&str> {
        self.stack.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Same state with a different stack
    ///
    /// Callers must keep the stack non-empty and its keys disjoint from the
    /// search entry.
    pub(crate) fn with_stack(&self, stack: Vec<RouteEntry>) -> Self {
        debug_assert!(!stack.is_empty(), "stack must keep its root");
        Self {
            stack,
            search_entry: self.search_entry.clone(),
            layout_class: self.layout_class,
        }
    }

    /// Same state with a different search entry
    pub(crate) fn with_search(&self, search_entry: Option<RouteEntry>) -> Self {
        Self {
            stack: self.stack.clone(),
            search_entry,
            layout_class: self.layout_class,
        }
    }

    /// Same state under a different layout class
    pub(crate) fn with_layout(&self, layout_class: LayoutClass) -> Self {
        Self {
            stack: self.stack.clone(),
            search_entry: self.search_entry.clone(),
            layout_class,
        }
    }
}
