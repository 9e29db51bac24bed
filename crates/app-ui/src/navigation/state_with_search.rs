//! State composition and publication
//!
//! The stack engine only knows about the route stack. This hook owns the
//! composed [`RouteState`] (stack, search entry and layout class) and
//! publishes one version per applied action, so a subscriber can never see the
//! stack of action N next to the search entry of action N-1.

use super::route_state::{RouteEntry, RouteState};
use super::router::ActionKind;
use super::{NavigationError, Result};
use app_state::store::{StateStore, Versioned};
use tokio::sync::{broadcast, watch};

/// What produced a published state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    /// Initial state on mount
    Mount,
    /// A dispatched action
    Action(ActionKind),
    /// A stack reported by the engine itself (native back gesture etc.)
    EngineSync,
}

/// A published state together with its cause
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// Cause of the change
    pub cause: ChangeCause,
    /// The composed state
    pub state: RouteState,
}

/// Publishes composed navigation state to subscribers
#[derive(Debug)]
pub struct StateWithSearch {
    store: StateStore<StateChange>,
}

impl StateWithSearch {
    /// Create an unmounted hook buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        Self {
            store: StateStore::new(capacity),
        }
    }

    /// Publish the initial state
    pub fn mount(&self, initial: RouteState) -> u64 {
        self.store.publish(StateChange {
            cause: ChangeCause::Mount,
            state: initial,
        })
    }

    /// Drop the current state
    pub fn unmount(&self) {
        self.store.clear();
    }

    /// Whether a state is held
    pub fn is_mounted(&self) -> bool {
        self.store.is_initialized()
    }

    /// Current composed state
    pub fn current(&self) -> Result<RouteState> {
        self.snapshot().map(|snapshot| snapshot.value.state.clone())
    }

    /// Current state with its version and cause
    pub fn snapshot(&self) -> Result<Versioned<StateChange>> {
        self.store.current().map_err(|_| not_mounted())
    }

    /// Version of the latest published state
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Merge a router result into the current state
    ///
    /// The stack always comes from `next`. The search entry and layout class
    /// are only taken from `next` when the action kind targets them;
    /// otherwise the previously published values are kept.
    pub fn compose(prev: &RouteState, next: RouteState, kind: ActionKind) -> Result<RouteState> {
        let search_entry = if kind.targets_search() {
            next.search_entry().cloned()
        } else {
            prev.search_entry().cloned()
        };
        let layout_class = if kind.targets_layout() {
            next.layout_class()
        } else {
            prev.layout_class()
        };
        RouteState::new(next.stack().to_vec(), search_entry, layout_class)
    }

    /// Compose and publish the result of an applied action
    pub fn apply_transition(&self, next: RouteState, kind: ActionKind) -> Result<u64> {
        let prev = self.current()?;
        let composed = Self::compose(&prev, next, kind)?;
        Ok(self.store.publish(StateChange {
            cause: ChangeCause::Action(kind),
            state: composed,
        }))
    }

    /// Adopt a stack reported by the engine, keeping search and layout
    ///
    /// Returns the current version unchanged when the stack is identical.
    pub fn sync_from_engine(&self, stack: Vec<RouteEntry>) -> Result<u64> {
        let prev = self.current()?;
        if prev.stack() == stack.as_slice() {
            return Ok(self.store.version());
        }
        let composed = RouteState::new(
            stack,
            prev.search_entry().cloned(),
            prev.layout_class(),
        )?;
        Ok(self.store.publish(StateChange {
            cause: ChangeCause::EngineSync,
            state: composed,
        }))
    }

    /// Subscribe to every published version, in order
    pub fn subscribe(&self) -> broadcast::Receiver<Versioned<StateChange>> {
        self.store.subscribe()
    }

    /// Subscribe to the latest version only
    pub fn watch(&self) -> watch::Receiver<Option<Versioned<StateChange>>> {
        self.store.watch()
    }
}

fn not_mounted() -> NavigationError {
    NavigationError::InvalidAction("navigator is not mounted".to_string())
}
