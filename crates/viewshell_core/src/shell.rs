//! Shell bootstrap and event plumbing.
//!
//! # Responsibility
//! - Own the document, host, initializer registry and deferred work.
//! - Boot the shell once: page reveal, splash screen, initial view.
//! - Turn host events into navigation intents or widget callbacks.
//!
//! # Invariants
//! - The splash screen is dismissed at most once.
//! - Link clicks and history events only enqueue; navigations run when the
//!   owner drains the queue, one at a time.
//!
//! # See also
//! - `crate::router` for the navigation state machine on `Shell`.

use crate::config::ShellConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::events::{DispatchOutcome, ShellEvent};
use crate::host::{location_hash, ShellHost};
use crate::router::{
    intercepted_href, NavigationIntent, NavigationOutcome, TransitionState, ENTERING_CLASS,
};
use crate::timer::{TimerAction, TimerQueue};
use crate::widgets::{InitFailure, WidgetContext, WidgetRegistry};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Body class that reveals the shell after boot.
pub const PAGE_IN_CLASS: &str = "page-in";
pub const SPLASH_ID: &str = "splash";
pub const SPLASH_HIDDEN_CLASS: &str = "is-hidden";
/// Body class that blocks scrolling while the splash is up.
pub const SPLASH_LOCK_CLASS: &str = "splash-lock";

pub struct Shell<H: ShellHost> {
    pub(crate) config: ShellConfig,
    pub(crate) host: H,
    pub(crate) document: Document,
    pub(crate) widgets: WidgetRegistry,
    pub(crate) timers: TimerQueue,
    pub(crate) state: TransitionState,
    pub(crate) pending: VecDeque<NavigationIntent>,
    /// Bumped per completed swap; only the newest enter timer may fire.
    pub(crate) enter_generation: u64,
    splash_dismissed: bool,
}

impl<H: ShellHost> Shell<H> {
    pub fn new(config: ShellConfig, host: H, document: Document, widgets: WidgetRegistry) -> Self {
        Self {
            config,
            host,
            document,
            widgets,
            timers: TimerQueue::new(),
            state: TransitionState::Idle,
            pending: VecDeque::new(),
            enter_generation: 0,
            splash_dismissed: false,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn transition_state(&self) -> TransitionState {
        self.state
    }

    pub fn pending_navigations(&self) -> usize {
        self.pending.len()
    }

    /// Persistent container of the active view.
    pub fn mount(&self) -> Option<NodeId> {
        self.document.get_element_by_id(&self.config.mount_id)
    }

    /// One-time startup. Returns the initial navigation, if one ran.
    pub async fn boot(&mut self) -> Option<NavigationOutcome> {
        if let Some(body) = self.document.body() {
            self.document.add_class(body, PAGE_IN_CLASS);
        }
        if self.document.get_element_by_id(SPLASH_ID).is_some() {
            let now = self.host.now();
            self.timers
                .schedule(now, self.config.splash_timeout(), TimerAction::DismissSplash);
        }

        let Some(mount) = self.mount() else {
            warn!(
                "event=boot module=shell status=skipped reason=mount_missing mount_id={}",
                self.config.mount_id
            );
            return None;
        };
        if !self.document.has_content(mount) {
            let hash = location_hash(&self.host.location_href()).to_string();
            info!("event=boot module=shell status=ok initial_view={hash:?}");
            return Some(self.navigate(Some(hash.as_str()), false).await);
        }

        info!("event=boot module=shell status=ok initial_view=prerendered");
        self.init_view(mount);
        None
    }

    /// Re-runs every initializer against the mount point.
    pub fn reinit_view(&mut self) -> Vec<InitFailure> {
        match self.mount() {
            Some(mount) => self.init_view(mount),
            None => Vec::new(),
        }
    }

    /// Forwards a host event. Navigations raised here are queued, not run.
    pub fn dispatch(&mut self, event: ShellEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        match &event {
            ShellEvent::PopState => {
                let view = self.popstate_view();
                self.enqueue_navigation(Some(view.as_str()), false);
                return outcome;
            }
            ShellEvent::Click { target, .. } => {
                let href = self.host.location_href();
                if let Some(link) = intercepted_href(&self.document, *target, &self.config, &href)
                {
                    outcome.default_prevented = true;
                    self.enqueue_navigation(Some(link.as_str()), true);
                }
                if self
                    .document
                    .closest(*target, &Selector::id(SPLASH_ID))
                    .is_some()
                {
                    self.dismiss_splash();
                }
            }
            ShellEvent::TransitionEnd { target, .. } => {
                if self.document.body() == Some(*target)
                    && self.document.has_class(*target, ENTERING_CLASS)
                {
                    self.document.remove_class(*target, ENTERING_CLASS);
                }
            }
            _ => {}
        }
        self.with_widgets(|widgets, cx| widgets.dispatch(cx, &event));
        outcome
    }

    /// Fires every timer due at the host's current time. Returns the count.
    pub fn run_due_timers(&mut self) -> usize {
        let due = self.timers.take_due(self.host.now());
        let fired = due.len();
        for action in due {
            self.fire(action);
        }
        fired
    }

    /// Runs the callbacks requested for the next animation frame.
    pub fn run_animation_frame(&mut self) -> usize {
        let frame = self.timers.take_frame();
        let fired = frame.len();
        for action in frame {
            self.fire(action);
        }
        fired
    }

    pub(crate) fn init_view(&mut self, mount: NodeId) -> Vec<InitFailure> {
        self.with_widgets(|widgets, cx| widgets.init_all(cx, mount))
    }

    fn with_widgets<R>(
        &mut self,
        run: impl FnOnce(&mut WidgetRegistry, &mut WidgetContext<'_>) -> R,
    ) -> R {
        let now = self.host.now();
        let mut cx = WidgetContext::new(
            &mut self.document,
            &self.host,
            &self.config,
            &mut self.timers,
            now,
        );
        run(&mut self.widgets, &mut cx)
    }

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::ClearEnterMarker { generation } => {
                if generation != self.enter_generation {
                    return;
                }
                if let Some(body) = self.document.body() {
                    self.document.remove_class(body, ENTERING_CLASS);
                }
            }
            TimerAction::DismissSplash => self.dismiss_splash(),
            TimerAction::Widget {
                owner,
                node,
                generation,
            } => self.with_widgets(|widgets, cx| widgets.fire_timer(cx, owner, node, generation)),
        }
    }

    fn dismiss_splash(&mut self) {
        if self.splash_dismissed {
            return;
        }
        let Some(splash) = self.document.get_element_by_id(SPLASH_ID) else {
            return;
        };
        self.splash_dismissed = true;
        if self.document.has_class(splash, SPLASH_HIDDEN_CLASS) {
            return;
        }
        self.document.add_class(splash, SPLASH_HIDDEN_CLASS);
        if let Some(body) = self.document.body() {
            self.document.remove_class(body, SPLASH_LOCK_CLASS);
        }
        debug!("event=splash_dismiss module=shell status=ok");
    }
}
