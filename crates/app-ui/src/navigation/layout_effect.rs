//! Layout change effect
//!
//! Keeps the stack in a valid shape for the layout class:
//!
//! - narrowing splits a side-by-side master/detail pair into two sequential
//!   entries `[master, detail]`
//! - widening folds a `[.., master, detail]` tail into a pair, leaving
//!   earlier entries full width
//!
//! Pane roles are derived from the stack and the layout class alone, so the
//! same stack always gets the same roles however it was reached. Both
//! directions keep keys and params, so narrowing then widening restores the
//! original tail exactly.
//!
//! Observations are not applied immediately. The latest one is held as
//! pending until the navigator drains it, and a newer observation replaces an
//! older one that has not been applied yet.

use super::route_state::{Pane, RouteEntry, RouteState};
use super::router::Action;
use crate::config::SplitConfig;
use crate::layout::LayoutClass;
use std::collections::HashSet;

/// Which routes form master/detail pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReshapePolicy {
    master_routes: HashSet<String>,
    detail_routes: HashSet<String>,
}

impl ReshapePolicy {
    /// Create a policy from route names
    pub fn new<M, D>(master_routes: M, detail_routes: D) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            master_routes: master_routes.into_iter().map(Into::into).collect(),
            detail_routes: detail_routes.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a policy from the split configuration
    pub fn from_config(split: &SplitConfig) -> Self {
        Self::new(split.master_routes.iter().cloned(), split.detail_routes.iter().cloned())
    }

    /// Whether a route plays the master role
    pub fn is_master(&self, name: &str) -> bool {
        self.master_routes.contains(name)
    }

    /// Whether a route plays the detail role
    pub fn is_detail(&self, name: &str) -> bool {
        self.detail_routes.contains(name)
    }

    /// Linear stack for the narrow layout
    pub fn narrow(&self, stack: &[RouteEntry]) -> Vec<RouteEntry> {
        stack
            .iter()
            .map(|entry| entry.clone().with_pane(Pane::Full))
            .collect()
    }

    /// Stack with its master/detail tail paired for the wide layout
    ///
    /// Roles left over from an earlier shape are cleared first, so a master
    /// whose detail was popped goes back to full width.
    pub fn widen(&self, stack: &[RouteEntry]) -> Vec<RouteEntry> {
        let mut reshaped = self.narrow(stack);
        let len = reshaped.len();
        if len < 2 {
            return reshaped;
        }

        let (master, detail) = (&reshaped[len - 2], &reshaped[len - 1]);
        if self.is_master(&master.name) && self.is_detail(&detail.name) {
            reshaped[len - 2].pane = Pane::Master;
            reshaped[len - 1].pane = Pane::Detail;
        }
        reshaped
    }

    /// Reshape a stack for a target layout
    pub fn reshape(&self, stack: &[RouteEntry], target: LayoutClass) -> Vec<RouteEntry> {
        match target {
            LayoutClass::Narrow => self.narrow(stack),
            LayoutClass::Wide => self.widen(stack),
        }
    }
}

/// Effect resetting the stack when its shape does not match the layout
#[derive(Debug, Clone)]
pub struct LayoutChangeEffect {
    policy: ReshapePolicy,
    pending: Option<LayoutClass>,
}

impl LayoutChangeEffect {
    /// Create an effect with a reshape policy
    pub fn new(policy: ReshapePolicy) -> Self {
        Self {
            policy,
            pending: None,
        }
    }

    /// The reshape policy
    pub fn policy(&self) -> &ReshapePolicy {
        &self.policy
    }

    /// Drop any observation left from a previous mount
    pub fn mount(&mut self) {
        self.pending = None;
    }

    /// Forget all observations
    pub fn unmount(&mut self) {
        self.pending = None;
    }

    /// Record a layout observation
    ///
    /// Every observation is held until the next drain, where it is checked
    /// against the state itself. A newer observation supersedes a pending one.
    pub fn observe(&mut self, layout_class: LayoutClass) {
        if let Some(stale) = self.pending.replace(layout_class) {
            if stale != layout_class {
                tracing::debug!(%stale, latest = %layout_class, "superseding pending layout reshape");
            }
        }
    }

    /// Layout class waiting to be applied
    pub fn pending(&self) -> Option<LayoutClass> {
        self.pending
    }

    /// Actions bringing the state in line with the target layout
    ///
    /// The target is the pending observation, or the state's own layout class
    /// when nothing is pending. Yields a `Reset` when the stack's pane roles
    /// differ from the ones derived for the target, followed by
    /// `SetLayoutClass` when the class itself changes. Yields nothing for a
    /// state that is already in shape.
    pub fn take_actions(&mut self, state: &RouteState) -> Vec<Action> {
        let target = self.pending.take().unwrap_or_else(|| state.layout_class());
        let flips = state.layout_class() != target;

        let reshaped = self.policy.reshape(state.stack(), target);
        let mut actions = Vec::with_capacity(2);
        if reshaped.as_slice() != state.stack() {
            actions.push(Action::reset(reshaped));
        }
        if flips {
            actions.push(Action::SetLayoutClass(target));
            tracing::info!(
                from = %state.layout_class(),
                to = %target,
                reshaped = actions.len() > 1,
                "layout class changed"
            );
        } else if !actions.is_empty() {
            tracing::debug!(layout = %target, "re-deriving pane roles");
        }
        actions
    }
}
