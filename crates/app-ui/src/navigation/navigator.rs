//! Responsive stack navigator
//!
//! Binds the custom router, the search-aware state hook, the layout change
//! effect and the search renderer onto an external [`StackEngine`].
//!
//! All actions go through one FIFO queue. Anything dispatched while the
//! navigator is already applying an action (for example from inside
//! [`StackEngine::commit`] through a [`Dispatcher`] handle) is queued and
//! applied afterwards, never interleaved with the in-flight transition.
//! A pending layout reshape is applied before the next queued action, and
//! pane roles are re-derived after every applied action.
//!
//! [`ResponsiveStackNavigator::dispatch`] reports only the outcome of the
//! action it was given. Queued actions that fail are logged, skipped and kept
//! on the [`Dispatcher`] for whoever queued them to collect.

use super::layout_effect::{LayoutChangeEffect, ReshapePolicy};
use super::route_state::{RouteEntry, RouteState};
use super::router::{Action, ActionKind, CustomRouter, InitialStateOptions};
use super::search_route::{RenderPlan, SearchRouteRenderer};
use super::state_with_search::{StateChange, StateWithSearch};
use super::{NavigationError, Result};
use crate::config::NavigatorConfig;
use crate::layout::LayoutClass;
use app_state::store::Versioned;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

// =============================================================================
// Engine Capability
// =============================================================================

/// External stack engine (screen mounting, transitions, gestures)
#[cfg_attr(test, mockall::automock)]
pub trait StackEngine {
    /// Render a newly published state; `plan` says where search goes
    fn commit(&mut self, state: &RouteState, plan: RenderPlan);
}

/// Default number of commits a [`RecordingEngine`] keeps
pub const DEFAULT_RECORDING_LIMIT: usize = 64;

/// Engine that only records what it was asked to render
///
/// Meant for tests and headless hosts that have no screens to mount. Only the
/// most recent commits are kept; older ones are dropped once the limit is
/// reached.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    commits: VecDeque<(RouteState, RenderPlan)>,
    limit: usize,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RECORDING_LIMIT)
    }
}

impl RecordingEngine {
    /// Create an engine keeping at most `limit` commits (at least one)
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            commits: VecDeque::with_capacity(limit.min(DEFAULT_RECORDING_LIMIT)),
            limit,
        }
    }

    /// Retained commits, oldest first
    pub fn commits(&self) -> &VecDeque<(RouteState, RenderPlan)> {
        &self.commits
    }

    /// The latest commit
    pub fn last(&self) -> Option<&(RouteState, RenderPlan)> {
        self.commits.back()
    }
}

impl StackEngine for RecordingEngine {
    fn commit(&mut self, state: &RouteState, plan: RenderPlan) {
        if self.commits.len() == self.limit {
            self.commits.pop_front();
        }
        self.commits.push_back((state.clone(), plan));
    }
}

// =============================================================================
// Dispatch Queue
// =============================================================================

/// A queued action the navigator could not apply
#[derive(Debug)]
pub struct DispatchFailure {
    /// Kind of the rejected action
    pub kind: ActionKind,
    /// Why it was rejected
    pub error: NavigationError,
}

/// Cloneable handle for queueing navigation actions
///
/// Actions dispatched through a handle are applied the next time the
/// navigator drains its queue. Their errors cannot be returned to the caller
/// that queued them, so they are collected here until
/// [`Dispatcher::take_failures`] is called.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    queue: Arc<Mutex<VecDeque<Action>>>,
    failures: Arc<Mutex<Vec<DispatchFailure>>>,
}

impl Dispatcher {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action
    pub fn dispatch(&self, action: Action) {
        self.queue.lock().push_back(action);
    }

    /// Number of queued actions
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drain the failures of queued actions, oldest first
    pub fn take_failures(&self) -> Vec<DispatchFailure> {
        std::mem::take(&mut *self.failures.lock())
    }

    fn next(&self) -> Option<Action> {
        self.queue.lock().pop_front()
    }

    fn record_failure(&self, kind: ActionKind, error: NavigationError) {
        self.failures.lock().push(DispatchFailure { kind, error });
    }

    fn clear(&self) -> usize {
        self.failures.lock().clear();
        let mut queue = self.queue.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// The pieces plugged into the stack engine's extension points
#[derive(Debug)]
pub struct NavigatorExtensions {
    /// Router override
    pub router: CustomRouter,
    /// Custom state provider
    pub state: StateWithSearch,
    /// Custom effect
    pub effect: LayoutChangeEffect,
    /// Extra content renderer
    pub renderer: SearchRouteRenderer,
}

impl NavigatorExtensions {
    /// Build the default extensions for a configuration
    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self {
            router: CustomRouter::new(config),
            state: StateWithSearch::new(config.event_buffer),
            effect: LayoutChangeEffect::new(ReshapePolicy::from_config(&config.split)),
            renderer: SearchRouteRenderer::new(),
        }
    }
}

/// Stack navigator with search and layout awareness
#[derive(Debug)]
pub struct ResponsiveStackNavigator<E> {
    config: NavigatorConfig,
    extensions: NavigatorExtensions,
    engine: E,
    dispatcher: Dispatcher,
}

/// Create a responsive stack navigator on top of an engine
pub fn create_responsive_stack_navigator<E: StackEngine>(
    config: NavigatorConfig,
    engine: E,
) -> Result<ResponsiveStackNavigator<E>> {
    config.validate()?;
    let extensions = NavigatorExtensions::from_config(&config);
    Ok(ResponsiveStackNavigator::new(config, extensions, engine))
}

impl<E: StackEngine> ResponsiveStackNavigator<E> {
    /// Assemble a navigator from explicit extensions
    pub fn new(config: NavigatorConfig, extensions: NavigatorExtensions, engine: E) -> Self {
        Self {
            config,
            extensions,
            engine,
            dispatcher: Dispatcher::new(),
        }
    }

    /// Seed the root entry and render it
    pub fn mount(&mut self, layout_class: LayoutClass) -> Result<RouteState> {
        if self.is_mounted() {
            return Err(NavigationError::InvalidAction(
                "navigator is already mounted".to_string(),
            ));
        }

        let options = InitialStateOptions::from_config(&self.config, layout_class);
        let initial = self.extensions.router.get_initial_state(&options)?;

        let dropped = self.dispatcher.clear();
        if dropped > 0 {
            tracing::warn!(dropped, "discarding actions queued before mount");
        }

        self.extensions.effect.mount();
        self.extensions.state.mount(initial.clone());
        let plan = self.extensions.renderer.decide(&initial);
        self.engine.commit(&initial, plan);

        tracing::info!(
            root = %initial.root().name,
            layout = %layout_class,
            "navigator mounted"
        );
        Ok(initial)
    }

    /// Mount using a window width to pick the layout
    pub fn mount_with_width(&mut self, width: u32) -> Result<RouteState> {
        self.mount(LayoutClass::from_width(width, self.config.wide_breakpoint))
    }

    /// Tear down all state
    pub fn unmount(&mut self) {
        self.extensions.state.unmount();
        self.extensions.effect.unmount();
        self.dispatcher.clear();
        tracing::info!("navigator unmounted");
    }

    /// Whether the navigator has been mounted
    pub fn is_mounted(&self) -> bool {
        self.extensions.state.is_mounted()
    }

    /// Apply an action after everything queued before it
    ///
    /// Returns the outcome of `action` only. When it fails it is dropped and
    /// the state stays as it was before it. Failures of other queued actions
    /// applied along the way go to [`Dispatcher::take_failures`].
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if !self.is_mounted() {
            tracing::warn!(action = %action.kind(), "action dispatched before mount");
            return Err(NavigationError::InvalidAction(format!(
                "{} dispatched before the navigator was mounted",
                action.kind()
            )));
        }
        self.drain();
        let result = self.apply(action);
        self.drain();
        result
    }

    /// Hardware or gesture back
    ///
    /// Fails with [`NavigationError::CannotPopRoot`] at the root; hosts
    /// should dismiss the whole navigator in that case.
    pub fn go_back(&mut self) -> Result<()> {
        self.dispatch(Action::GoBack)
    }

    /// Whether back would do anything
    pub fn can_go_back(&self) -> bool {
        self.extensions
            .state
            .current()
            .map(|state| self.extensions.router.can_go_back(&state))
            .unwrap_or(false)
    }

    /// Feed a layout class observation
    pub fn on_layout_class(&mut self, layout_class: LayoutClass) -> Result<()> {
        if !self.is_mounted() {
            tracing::debug!(layout = %layout_class, "ignoring layout change before mount");
            return Ok(());
        }
        self.extensions.effect.observe(layout_class);
        self.flush()
    }

    /// Feed a window width observation
    pub fn on_window_width(&mut self, width: u32) -> Result<()> {
        self.on_layout_class(LayoutClass::from_width(width, self.config.wide_breakpoint))
    }

    /// Adopt a stack the engine changed on its own
    pub fn on_engine_state(&mut self, stack: Vec<RouteEntry>) -> Result<()> {
        let version = self.extensions.state.sync_from_engine(stack)?;
        tracing::debug!(version, "engine stack adopted");
        self.flush()
    }

    /// Apply every queued action, pending layout reshapes first
    ///
    /// Fails only when the navigator is not mounted. Queued actions that are
    /// rejected are skipped and reported through
    /// [`Dispatcher::take_failures`].
    pub fn flush(&mut self) -> Result<()> {
        self.extensions.state.current()?;
        self.drain();
        Ok(())
    }

    fn drain(&mut self) {
        loop {
            self.reshape();
            let Some(action) = self.dispatcher.next() else {
                return;
            };
            let kind = action.kind();
            if let Err(error) = self.apply(action) {
                tracing::warn!(action = %kind, %error, "skipping queued action");
                self.dispatcher.record_failure(kind, error);
            }
        }
    }

    /// Bring the pane roles in line with the layout, once
    fn reshape(&mut self) {
        let Ok(current) = self.extensions.state.current() else {
            return;
        };
        for action in self.extensions.effect.take_actions(&current) {
            let kind = action.kind();
            if let Err(error) = self.apply(action) {
                tracing::warn!(action = %kind, %error, "layout reshape rejected");
                self.dispatcher.record_failure(kind, error);
                return;
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<()> {
        let current = self.extensions.state.current()?;
        let kind = action.kind();

        let next = self
            .extensions
            .router
            .apply(&current, action)
            .inspect_err(|err| {
                tracing::warn!(action = %kind, error = %err, "navigation action rejected");
            })?;
        let version = self.extensions.state.apply_transition(next, kind)?;

        let published = self.extensions.state.current()?;
        let plan = self.extensions.renderer.decide(&published);
        tracing::debug!(
            action = %kind,
            version,
            depth = published.depth(),
            search = ?plan,
            "navigation action applied"
        );
        self.engine.commit(&published, plan);
        Ok(())
    }

    /// Current composed state
    pub fn state(&self) -> Result<RouteState> {
        self.extensions.state.current()
    }

    /// Where search should be rendered right now
    pub fn render_plan(&self) -> RenderPlan {
        self.extensions
            .state
            .current()
            .map(|state| self.extensions.renderer.decide(&state))
            .unwrap_or_default()
    }

    /// Subscribe to every state version, in order
    pub fn subscribe(&self) -> broadcast::Receiver<Versioned<StateChange>> {
        self.extensions.state.subscribe()
    }

    /// Subscribe to the latest state
    pub fn watch(&self) -> watch::Receiver<Option<Versioned<StateChange>>> {
        self.extensions.state.watch()
    }

    /// Handle for queueing actions from screens or the engine
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Navigator configuration
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Plugged-in extensions
    pub fn extensions(&self) -> &NavigatorExtensions {
        &self.extensions
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The underlying engine, mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyStrategy;
    use crate::navigation::route_state::{into_params, Pane, RouteParams};
    use crate::navigation::router::ActionKind;
    use crate::navigation::state_with_search::ChangeCause;
    use serde_json::json;

    fn config() -> NavigatorConfig {
        NavigatorConfig::new()
            .keys(KeyStrategy::Sequential)
            .split(["Inbox"], ["Chat"])
    }

    fn navigator() -> ResponsiveStackNavigator<RecordingEngine> {
        create_responsive_stack_navigator(config(), RecordingEngine::default()).unwrap()
    }

    fn push(name: &str) -> Action {
        Action::push(name, RouteParams::new())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NavigatorConfig::new().event_buffer(0);
        assert!(matches!(
            create_responsive_stack_navigator(config, RecordingEngine::default()),
            Err(NavigationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dispatch_before_mount() {
        let mut nav = navigator();
        assert!(matches!(
            nav.dispatch(push("Inbox")),
            Err(NavigationError::InvalidAction(_))
        ));
        assert!(nav.state().is_err());
        assert_eq!(nav.render_plan(), RenderPlan::None);
        assert!(nav.engine().commits().is_empty());
    }

    #[test]
    fn test_mount_twice_rejected() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        assert!(nav.mount(LayoutClass::Narrow).is_err());
    }

    #[test]
    fn test_mount_with_width() {
        let mut nav = navigator();
        let state = nav.mount_with_width(1024).unwrap();
        assert_eq!(state.layout_class(), LayoutClass::Wide);
        assert_eq!(state.route_names(), vec!["Home"]);
        assert_eq!(nav.engine().commits().len(), 1);
    }

    #[test]
    fn test_engine_receives_every_transition() {
        let mut engine = MockStackEngine::new();
        engine.expect_commit().times(3).return_const(());
        let mut nav = create_responsive_stack_navigator(config(), engine).unwrap();

        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatch(push("Inbox")).unwrap();
        nav.dispatch(Action::open_search(RouteParams::new())).unwrap();
    }

    #[test]
    fn test_engine_sees_render_plan() {
        let mut engine = MockStackEngine::new();
        engine
            .expect_commit()
            .withf(|_, plan| *plan == RenderPlan::None)
            .times(1)
            .return_const(());
        engine
            .expect_commit()
            .withf(|state, plan| *plan == RenderPlan::SidePane && state.is_search_open())
            .times(1)
            .return_const(());
        let mut nav = create_responsive_stack_navigator(config(), engine).unwrap();

        nav.mount(LayoutClass::Wide).unwrap();
        nav.dispatch(Action::open_search(RouteParams::new())).unwrap();
    }

    #[test]
    fn test_failed_action_leaves_state() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        let before = nav.state().unwrap();
        let version = nav.extensions().state.version();

        assert!(matches!(nav.go_back(), Err(NavigationError::CannotPopRoot)));
        assert_eq!(nav.state().unwrap(), before);
        assert_eq!(nav.extensions().state.version(), version);
        assert!(!nav.can_go_back());
    }

    #[test]
    fn test_dispatcher_handle_is_queued() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();

        let handle = nav.dispatcher();
        handle.dispatch(push("Inbox"));
        handle.dispatch(push("Chat"));
        assert_eq!(handle.len(), 2);
        assert_eq!(nav.state().unwrap().depth(), 1);

        nav.flush().unwrap();
        assert!(handle.is_empty());
        assert_eq!(nav.state().unwrap().route_names(), vec!["Home", "Inbox", "Chat"]);
    }

    #[test]
    fn test_actions_queued_before_mount_are_dropped() {
        let mut nav = navigator();
        nav.dispatcher().dispatch(push("Inbox"));
        nav.mount(LayoutClass::Narrow).unwrap();
        nav.flush().unwrap();
        assert_eq!(nav.state().unwrap().depth(), 1);
    }

    /// Engine that dispatches a follow-up action from inside its first commit
    struct ReentrantEngine {
        dispatcher: Dispatcher,
        fired: bool,
        depths: Vec<usize>,
    }

    impl StackEngine for ReentrantEngine {
        fn commit(&mut self, state: &RouteState, _plan: RenderPlan) {
            self.depths.push(state.depth());
            if state.depth() == 2 && !self.fired {
                self.fired = true;
                self.dispatcher.dispatch(Action::push("Chat", RouteParams::new()));
            }
        }
    }

    #[test]
    fn test_reentrant_dispatch_is_serialized() {
        let config = config();
        let extensions = NavigatorExtensions::from_config(&config);
        let mut nav = ResponsiveStackNavigator::new(
            config,
            extensions,
            ReentrantEngine {
                dispatcher: Dispatcher::new(),
                fired: false,
                depths: Vec::new(),
            },
        );
        let handle = nav.dispatcher();
        nav.engine_mut().dispatcher = handle;

        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatch(push("Inbox")).unwrap();

        assert_eq!(nav.engine().depths, vec![1, 2, 3]);
        assert_eq!(nav.state().unwrap().route_names(), vec!["Home", "Inbox", "Chat"]);
    }

    #[test]
    fn test_queued_failure_does_not_leak_into_dispatch() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();

        let handle = nav.dispatcher();
        handle.dispatch(Action::pop());
        nav.dispatch(push("Inbox")).unwrap();

        assert_eq!(nav.state().unwrap().depth(), 2);
        assert!(handle.is_empty());
        let failures = handle.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, ActionKind::Pop);
        assert!(matches!(failures[0].error, NavigationError::CannotPopRoot));
        assert!(handle.take_failures().is_empty());
    }

    #[test]
    fn test_dispatch_reports_own_failure_after_queue() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();

        nav.dispatcher().dispatch(push("Inbox"));
        assert!(matches!(
            nav.dispatch(Action::pop_n(2)),
            Err(NavigationError::CannotPopRoot)
        ));
        assert_eq!(nav.state().unwrap().route_names(), vec!["Home", "Inbox"]);
        assert!(nav.dispatcher().take_failures().is_empty());
    }

    #[test]
    fn test_layout_change_applies_before_queued_actions() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatch(push("Inbox")).unwrap();

        let mut rx = nav.subscribe();
        nav.dispatcher().dispatch(push("Chat"));
        nav.on_layout_class(LayoutClass::Wide).unwrap();

        let causes: Vec<ChangeCause> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| event.value.cause)
            .collect();
        assert_eq!(
            causes,
            vec![
                ChangeCause::Action(ActionKind::SetLayoutClass),
                ChangeCause::Action(ActionKind::Push),
                ChangeCause::Action(ActionKind::Reset),
            ]
        );

        let state = nav.state().unwrap();
        assert_eq!(state.layout_class(), LayoutClass::Wide);
        assert_eq!(state.stack()[1].pane, Pane::Master);
        assert_eq!(state.stack()[2].pane, Pane::Detail);
    }

    fn panes(nav: &ResponsiveStackNavigator<RecordingEngine>) -> Vec<Pane> {
        nav.state()
            .unwrap()
            .stack()
            .iter()
            .map(|entry| entry.pane)
            .collect()
    }

    #[test]
    fn test_direct_layout_action_keeps_panes_consistent() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatch(push("Inbox")).unwrap();
        nav.dispatch(push("Chat")).unwrap();
        nav.on_layout_class(LayoutClass::Wide).unwrap();
        assert_eq!(panes(&nav), vec![Pane::Full, Pane::Master, Pane::Detail]);

        nav.dispatch(Action::SetLayoutClass(LayoutClass::Narrow)).unwrap();
        nav.on_layout_class(LayoutClass::Narrow).unwrap();

        let state = nav.state().unwrap();
        assert_eq!(state.layout_class(), LayoutClass::Narrow);
        assert_eq!(panes(&nav), vec![Pane::Full; 3]);
    }

    #[test]
    fn test_wide_panes_follow_stack() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Wide).unwrap();
        nav.dispatch(push("Inbox")).unwrap();
        assert_eq!(panes(&nav), vec![Pane::Full, Pane::Full]);

        nav.dispatch(push("Chat")).unwrap();
        assert_eq!(panes(&nav), vec![Pane::Full, Pane::Master, Pane::Detail]);

        // Popping the detail leaves no orphaned master behind
        nav.dispatch(Action::pop()).unwrap();
        assert_eq!(panes(&nav), vec![Pane::Full, Pane::Full]);

        nav.dispatch(Action::replace("Chat", RouteParams::new())).unwrap();
        assert_eq!(panes(&nav), vec![Pane::Full, Pane::Full]);
    }

    #[test]
    fn test_recording_engine_is_bounded() {
        let mut engine = RecordingEngine::with_limit(2);
        let state = RouteState::new(
            vec![RouteEntry::new("r", "Home", RouteParams::new())],
            None,
            LayoutClass::Narrow,
        )
        .unwrap();
        engine.commit(&state, RenderPlan::None);
        engine.commit(&state, RenderPlan::Overlay);
        engine.commit(&state, RenderPlan::SidePane);

        assert_eq!(engine.commits().len(), 2);
        assert_eq!(engine.commits()[0].1, RenderPlan::Overlay);
        assert_eq!(engine.last().map(|(_, plan)| *plan), Some(RenderPlan::SidePane));
    }

    #[test]
    fn test_same_layout_is_noop() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Wide).unwrap();
        let version = nav.extensions().state.version();
        nav.on_window_width(1400).unwrap();
        assert_eq!(nav.extensions().state.version(), version);
    }

    #[test]
    fn test_layout_change_before_mount_ignored() {
        let mut nav = navigator();
        nav.on_layout_class(LayoutClass::Wide).unwrap();
        assert!(nav.extensions().effect.pending().is_none());
    }

    #[test]
    fn test_engine_state_sync_keeps_search() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatch(push("Inbox")).unwrap();
        nav.dispatch(Action::open_search(into_params(json!({"query": "x"}))))
            .unwrap();

        let root = nav.state().unwrap().root().clone();
        nav.on_engine_state(vec![root]).unwrap();

        let state = nav.state().unwrap();
        assert_eq!(state.depth(), 1);
        assert_eq!(
            state.search_entry().unwrap().param("query"),
            Some(&json!("x"))
        );
    }

    #[test]
    fn test_unmount_clears_everything() {
        let mut nav = navigator();
        nav.mount(LayoutClass::Narrow).unwrap();
        nav.dispatcher().dispatch(push("Inbox"));
        nav.unmount();
        assert!(!nav.is_mounted());
        assert!(nav.dispatcher().is_empty());

        // A fresh mount starts over
        let state = nav.mount(LayoutClass::Wide).unwrap();
        assert_eq!(state.depth(), 1);
    }
}
