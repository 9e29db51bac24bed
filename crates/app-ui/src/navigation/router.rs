//! Custom stack router
//!
//! [`CustomRouter::apply`] is the single place where navigation state changes.
//! It never mutates its input: every successful action returns a new
//! [`RouteState`], and every failed action leaves the caller holding the
//! untouched previous state.
//!
//! The router is layout-agnostic. [`Action::SetLayoutClass`] only records the
//! new class; restructuring the stack for a layout is the job of
//! [`LayoutChangeEffect`](super::layout_effect::LayoutChangeEffect), which
//! expresses it as an ordinary [`Action::Reset`].

use super::keys::{self, KeyGenerator};
use super::route_state::{RouteEntry, RouteParams, RouteState};
use super::{NavigationError, Result};
use crate::config::NavigatorConfig;
use crate::layout::LayoutClass;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Actions
// =============================================================================

/// Navigation actions understood by the router
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Push a new entry on top of the stack
    Push {
        /// Route name
        name: String,
        /// Route params
        params: RouteParams,
    },
    /// Remove the top `count` entries
    Pop {
        /// Number of entries to remove
        count: usize,
    },
    /// Truncate the stack to its root
    PopToTop,
    /// Go back to the topmost entry with this name, or push it
    Navigate {
        /// Route name
        name: String,
        /// Replacement params for an existing entry, or params for a new one
        params: Option<RouteParams>,
    },
    /// Swap the top entry for a new one
    Replace {
        /// Route name
        name: String,
        /// Route params
        params: RouteParams,
    },
    /// Replace the whole stack
    Reset {
        /// New stack, root first
        stack: Vec<RouteEntry>,
    },
    /// Merge params into a live entry
    SetParams {
        /// Key of the stack or search entry
        key: String,
        /// Params to merge
        params: RouteParams,
    },
    /// Open search, or update its params if already open
    OpenSearch {
        /// Search params
        params: RouteParams,
    },
    /// Close search
    CloseSearch,
    /// Record the current layout class
    SetLayoutClass(LayoutClass),
    /// Hardware or gesture back
    GoBack,
}

impl Action {
    /// Push a route
    pub fn push(name: impl Into<String>, params: RouteParams) -> Self {
        Action::Push {
            name: name.into(),
            params,
        }
    }

    /// Pop one entry
    pub fn pop() -> Self {
        Action::Pop { count: 1 }
    }

    /// Pop several entries
    pub fn pop_n(count: usize) -> Self {
        Action::Pop { count }
    }

    /// Navigate to a route
    pub fn navigate(name: impl Into<String>, params: Option<RouteParams>) -> Self {
        Action::Navigate {
            name: name.into(),
            params,
        }
    }

    /// Replace the top route
    pub fn replace(name: impl Into<String>, params: RouteParams) -> Self {
        Action::Replace {
            name: name.into(),
            params,
        }
    }

    /// Reset the stack
    pub fn reset(stack: Vec<RouteEntry>) -> Self {
        Action::Reset { stack }
    }

    /// Open search
    pub fn open_search(params: RouteParams) -> Self {
        Action::OpenSearch { params }
    }

    /// Kind of this action, without its payload
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Push { .. } => ActionKind::Push,
            Action::Pop { .. } => ActionKind::Pop,
            Action::PopToTop => ActionKind::PopToTop,
            Action::Navigate { .. } => ActionKind::Navigate,
            Action::Replace { .. } => ActionKind::Replace,
            Action::Reset { .. } => ActionKind::Reset,
            Action::SetParams { .. } => ActionKind::SetParams,
            Action::OpenSearch { .. } => ActionKind::OpenSearch,
            Action::CloseSearch => ActionKind::CloseSearch,
            Action::SetLayoutClass(_) => ActionKind::SetLayoutClass,
            Action::GoBack => ActionKind::GoBack,
        }
    }
}

/// Payload-free action discriminant, used for logging and change causes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// [`Action::Push`]
    Push,
    /// [`Action::Pop`]
    Pop,
    /// [`Action::PopToTop`]
    PopToTop,
    /// [`Action::Navigate`]
    Navigate,
    /// [`Action::Replace`]
    Replace,
    /// [`Action::Reset`]
    Reset,
    /// [`Action::SetParams`]
    SetParams,
    /// [`Action::OpenSearch`]
    OpenSearch,
    /// [`Action::CloseSearch`]
    CloseSearch,
    /// [`Action::SetLayoutClass`]
    SetLayoutClass,
    /// [`Action::GoBack`]
    GoBack,
}

impl ActionKind {
    /// Whether actions of this kind may change the search entry
    pub fn targets_search(self) -> bool {
        matches!(
            self,
            ActionKind::OpenSearch
                | ActionKind::CloseSearch
                | ActionKind::SetParams
                | ActionKind::GoBack
        )
    }

    /// Whether actions of this kind may change the layout class
    pub fn targets_layout(self) -> bool {
        self == ActionKind::SetLayoutClass
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Push => "PUSH",
            ActionKind::Pop => "POP",
            ActionKind::PopToTop => "POP_TO_TOP",
            ActionKind::Navigate => "NAVIGATE",
            ActionKind::Replace => "REPLACE",
            ActionKind::Reset => "RESET",
            ActionKind::SetParams => "SET_PARAMS",
            ActionKind::OpenSearch => "OPEN_SEARCH",
            ActionKind::CloseSearch => "CLOSE_SEARCH",
            ActionKind::SetLayoutClass => "SET_LAYOUT_CLASS",
            ActionKind::GoBack => "GO_BACK",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Router
// =============================================================================

/// Options for seeding the initial state
#[derive(Debug, Clone, PartialEq)]
pub struct InitialStateOptions {
    /// Root route name
    pub route_name: String,
    /// Root params
    pub params: RouteParams,
    /// Layout at mount time
    pub layout_class: LayoutClass,
}

impl InitialStateOptions {
    /// Options from the navigator configuration
    pub fn from_config(config: &NavigatorConfig, layout_class: LayoutClass) -> Self {
        Self {
            route_name: config.initial_route.clone(),
            params: config.initial_params.clone(),
            layout_class,
        }
    }
}

/// Router handling stack and search transitions
#[derive(Clone)]
pub struct CustomRouter {
    keys: Arc<dyn KeyGenerator>,
    search_route: String,
}

impl fmt::Debug for CustomRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRouter")
            .field("search_route", &self.search_route)
            .finish_non_exhaustive()
    }
}

impl CustomRouter {
    /// Create a router from the navigator configuration
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            keys: keys::for_strategy(config.keys),
            search_route: config.search_route.clone(),
        }
    }

    /// Use a custom key generator
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Route name used for the search entry
    pub fn search_route(&self) -> &str {
        &self.search_route
    }

    /// Build the state a freshly mounted navigator starts from
    pub fn get_initial_state(&self, options: &InitialStateOptions) -> Result<RouteState> {
        if options.route_name.is_empty() {
            return Err(NavigationError::InvalidAction(
                "initial route name must not be empty".to_string(),
            ));
        }
        let key = self.keys.generate(&options.route_name);
        let root = RouteEntry::new(key, options.route_name.clone(), options.params.clone());
        RouteState::new(vec![root], None, options.layout_class)
    }

    /// What a back gesture resolves to in the given state
    ///
    /// In the narrow layout an open search entry sits conceptually on top of
    /// the stack, so back closes it first. In the wide layout search lives in
    /// a side pane and back always pops.
    pub fn back_action(&self, state: &RouteState) -> Action {
        if state.layout_class().is_narrow() && state.is_search_open() {
            Action::CloseSearch
        } else {
            Action::pop()
        }
    }

    /// Whether a back gesture would succeed
    pub fn can_go_back(&self, state: &RouteState) -> bool {
        match self.back_action(state) {
            Action::CloseSearch => true,
            _ => state.depth() > 1,
        }
    }

    /// Apply an action, producing the next state
    pub fn apply(&self, state: &RouteState, action: Action) -> Result<RouteState> {
        match action {
            Action::Push { name, params } => {
                let entry = self.fresh_entry(state, name, params)?;
                let mut stack = state.stack().to_vec();
                stack.push(entry);
                Ok(state.with_stack(stack))
            }
            Action::Pop { count } => self.pop(state, count),
            Action::PopToTop => Ok(state.with_stack(vec![state.root().clone()])),
            Action::Navigate { name, params } => {
                let existing = state.stack().iter().rposition(|entry| entry.name == name);
                match existing {
                    Some(index) => {
                        let mut stack = state.stack()[..=index].to_vec();
                        if let Some(params) = params {
                            stack[index].params = params;
                        }
                        Ok(state.with_stack(stack))
                    }
                    None => {
                        let entry = self.fresh_entry(state, name, params.unwrap_or_default())?;
                        let mut stack = state.stack().to_vec();
                        stack.push(entry);
                        Ok(state.with_stack(stack))
                    }
                }
            }
            Action::Replace { name, params } => {
                let entry = self.fresh_entry(state, name, params)?;
                let mut stack = state.stack().to_vec();
                stack.pop();
                stack.push(entry);
                Ok(state.with_stack(stack))
            }
            Action::Reset { stack } => self.reset(state, stack),
            Action::SetParams { key, params } => {
                if let Some(search) = state.search_entry().filter(|search| search.key == key) {
                    let updated = search.clone().with_merged_params(params);
                    return Ok(state.with_search(Some(updated)));
                }
                let index = state
                    .stack()
                    .iter()
                    .position(|entry| entry.key == key)
                    .ok_or_else(|| {
                        NavigationError::InvalidAction(format!("no route with key {key}"))
                    })?;
                let mut stack = state.stack().to_vec();
                stack[index] = stack[index].clone().with_merged_params(params);
                Ok(state.with_stack(stack))
            }
            Action::OpenSearch { params } => match state.search_entry() {
                Some(open) => {
                    // Keep the key so the open overlay is updated rather than remounted
                    let mut updated = open.clone();
                    updated.params = params;
                    Ok(state.with_search(Some(updated)))
                }
                None => {
                    let entry = self.fresh_entry(state, self.search_route.clone(), params)?;
                    Ok(state.with_search(Some(entry)))
                }
            },
            Action::CloseSearch => {
                if state.is_search_open() {
                    Ok(state.with_search(None))
                } else {
                    Ok(state.clone())
                }
            }
            Action::SetLayoutClass(layout_class) => Ok(state.with_layout(layout_class)),
            Action::GoBack => {
                let resolved = self.back_action(state);
                self.apply(state, resolved)
            }
        }
    }

    fn pop(&self, state: &RouteState, count: usize) -> Result<RouteState> {
        if count == 0 {
            return Ok(state.clone());
        }
        if count >= state.depth() {
            return Err(NavigationError::CannotPopRoot);
        }
        let remaining = state.depth() - count;
        Ok(state.with_stack(state.stack()[..remaining].to_vec()))
    }

    fn reset(&self, state: &RouteState, stack: Vec<RouteEntry>) -> Result<RouteState> {
        if stack.is_empty() {
            return Err(NavigationError::EmptyReset);
        }
        let mut seen = HashSet::with_capacity(stack.len());
        for entry in &stack {
            let clashes_with_search = state
                .search_entry()
                .is_some_and(|search| search.key == entry.key);
            if !seen.insert(entry.key.as_str()) || clashes_with_search {
                return Err(NavigationError::DuplicateResetKey(entry.key.clone()));
            }
        }
        Ok(state.with_stack(stack))
    }

    fn fresh_entry(
        &self,
        state: &RouteState,
        name: String,
        params: RouteParams,
    ) -> Result<RouteEntry> {
        let key = self.keys.generate(&name);
        if state.contains_key(&key) {
            tracing::error!(%key, route = %name, "generated route key is already live");
            return Err(NavigationError::KeyCollision(key));
        }
        Ok(RouteEntry::new(key, name, params))
    }
}
