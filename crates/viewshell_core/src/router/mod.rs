//! View router: the navigation state machine.
//!
//! # Responsibility
//! - Resolve a view identifier, fetch its fragment, extract the container and
//!   swap it into the mount point.
//! - Drive the leaving/entering markers, history and widget re-initialization.
//!
//! # Invariants
//! - Within one navigation the exit wait precedes the fetch, which precedes
//!   injection, which precedes the history update and re-initialization.
//! - A failed fetch or extraction leaves mount point, history and tone
//!   untouched and only removes the leaving marker.
//! - Injection has no suspension point between clearing the mount point and
//!   inserting the new container.
//! - Navigations never overlap: `navigate` holds `&mut Shell` until `Idle`,
//!   and event-raised intents are drained FIFO.

pub mod extract;
pub mod links;
pub mod path;

pub use extract::{extract_view, ViewFragment};
pub use links::{intercepted_href, is_internal_view_link};
pub use path::ViewId;

use crate::host::{
    location_hash, shell_url, CacheMode, FetchError, FetchRequest, ShellHost, TransitionPhase,
};
use crate::shell::Shell;
use crate::timer::TimerAction;
use crate::widgets::InitFailure;
use futures::future::{select, Either};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::pin::pin;
use url::Url;
use uuid::Uuid;

/// Body class present while the current view animates out.
pub const LEAVING_CLASS: &str = "animate-out";
/// Body class present while the new view animates in.
pub const ENTERING_CLASS: &str = "animate-in";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Exiting,
    Fetching,
    Parsing,
    Injecting,
    Entering,
}

impl TransitionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Exiting => "exiting",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Injecting => "injecting",
            Self::Entering => "entering",
        }
    }
}

/// Log correlation id of one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavigationId(Uuid);

impl NavigationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NavigationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NavigationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to transition to a view, with or without recording history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub id: NavigationId,
    /// Raw identifier; normalized when the navigation starts.
    pub view: Option<String>,
    pub push_history: bool,
}

impl NavigationIntent {
    pub fn new(view: Option<&str>, push_history: bool) -> Self {
        Self {
            id: NavigationId::new(),
            view: view.map(str::to_string),
            push_history,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    Completed {
        view: ViewId,
        /// Initializers that failed during re-init; the swap still stands.
        initializer_failures: Vec<InitFailure>,
    },
    Aborted {
        view: ViewId,
        error: RouteError,
    },
}

impl NavigationOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn view(&self) -> &ViewId {
        match self {
            Self::Completed { view, .. } | Self::Aborted { view, .. } => view,
        }
    }
}

impl Display for NavigationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed {
                view,
                initializer_failures,
            } => write!(
                f,
                "completed {view} ({} initializer failures)",
                initializer_failures.len()
            ),
            Self::Aborted { view, error } => write!(f, "aborted {view}: {error}"),
        }
    }
}

/// Recoverable navigation failures. All of them abort without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    MountMissing(String),
    InvalidUrl { url: String, reason: String },
    Fetch { view: String, source: FetchError },
    HttpStatus { view: String, status: u16 },
    Extraction { view: String },
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MountMissing(id) => write!(f, "mount point #{id} not found"),
            Self::InvalidUrl { url, reason } => write!(f, "cannot resolve `{url}`: {reason}"),
            Self::Fetch { view, source } => write!(f, "fetch failed for {view}: {source}"),
            Self::HttpStatus { view, status } => write!(f, "HTTP {status} for {view}"),
            Self::Extraction { view } => write!(f, "no view container found in {view}"),
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<H: ShellHost> Shell<H> {
    /// Transitions to `view`. Failures are logged and reported in the
    /// outcome; they never panic and never surface as UI.
    pub async fn navigate(&mut self, view: Option<&str>, push_history: bool) -> NavigationOutcome {
        self.run_intent(NavigationIntent::new(view, push_history))
            .await
    }

    /// Public entry point for scripted navigation; always records history.
    pub async fn load_view(&mut self, view: &str) -> NavigationOutcome {
        self.navigate(Some(view), true).await
    }

    /// Queues a navigation for [`Shell::run_pending_navigations`].
    pub fn enqueue_navigation(&mut self, view: Option<&str>, push_history: bool) -> NavigationId {
        let intent = NavigationIntent::new(view, push_history);
        let id = intent.id;
        debug!(
            "event=route_enqueue module=router nav_id={} view={:?} push={} queued={}",
            id,
            intent.view,
            push_history,
            self.pending.len() + 1
        );
        self.pending.push_back(intent);
        id
    }

    /// Runs queued navigations one after another, in arrival order.
    pub async fn run_pending_navigations(&mut self) -> Vec<NavigationOutcome> {
        let mut outcomes = Vec::new();
        while let Some(intent) = self.pending.pop_front() {
            outcomes.push(self.run_intent(intent).await);
        }
        outcomes
    }

    /// View encoded in the current address hash.
    pub fn view_from_location(&self) -> ViewId {
        ViewId::from_location(&self.host.location_href(), &self.config.default_view)
    }

    async fn run_intent(&mut self, intent: NavigationIntent) -> NavigationOutcome {
        let view = ViewId::normalize(intent.view.as_deref(), &self.config.default_view);
        let Some(mount) = self.mount() else {
            let error = RouteError::MountMissing(self.config.mount_id.clone());
            error!(
                "event=route_abort module=router status=error nav_id={} view={} error={}",
                intent.id, view, error
            );
            return NavigationOutcome::Aborted { view, error };
        };
        info!(
            "event=route_start module=router nav_id={} view={} push={}",
            intent.id, view, intent.push_history
        );

        self.set_state(TransitionState::Exiting, intent.id);
        if let Some(body) = self.document.body() {
            self.document.remove_class(body, ENTERING_CLASS);
            self.document.add_class(body, LEAVING_CLASS);
        }
        self.host.force_layout(&self.document, mount);
        self.wait_for_exit(intent.id).await;

        self.set_state(TransitionState::Fetching, intent.id);
        let fetched = self.fetch_view(&view).await;
        let html = match fetched {
            Ok(html) => html,
            Err(error) => return self.abort(&intent, view, error),
        };

        self.set_state(TransitionState::Parsing, intent.id);
        let Some(fragment) = extract_view(&html, &view, &self.config) else {
            let error = RouteError::Extraction {
                view: view.to_string(),
            };
            return self.abort(&intent, view, error);
        };

        self.set_state(TransitionState::Injecting, intent.id);
        let Some(root) = self.document.import_node(&fragment.document, fragment.root) else {
            let error = RouteError::Extraction {
                view: view.to_string(),
            };
            return self.abort(&intent, view, error);
        };
        self.document.remove_children(mount);
        self.document.append_child(mount, root);
        debug!(
            "event=route_inject module=router nav_id={} view={} name={} synthesized={}",
            intent.id, view, fragment.name, fragment.synthesized
        );

        if intent.push_history {
            let address = view.address(&self.host.location_href());
            self.host.push_history(&address);
        }

        let initializer_failures = self.init_view(mount);

        self.set_state(TransitionState::Entering, intent.id);
        if let Some(body) = self.document.body() {
            self.document.remove_class(body, LEAVING_CLASS);
            self.host.force_layout(&self.document, mount);
            self.document.add_class(body, ENTERING_CLASS);
        }
        self.enter_generation += 1;
        let now = self.host.now();
        self.timers.schedule(
            now,
            self.config.enter_delay(),
            TimerAction::ClearEnterMarker {
                generation: self.enter_generation,
            },
        );
        self.host.scroll_to_top();
        self.set_state(TransitionState::Idle, intent.id);

        info!(
            "event=route_done module=router status=ok nav_id={} view={} init_failures={}",
            intent.id,
            view,
            initializer_failures.len()
        );
        NavigationOutcome::Completed {
            view,
            initializer_failures,
        }
    }

    async fn wait_for_exit(&self, id: NavigationId) {
        let finished = pin!(self.host.transition_finished(TransitionPhase::Exit));
        let bound = pin!(self.host.sleep(self.config.exit_delay()));
        match select(finished, bound).await {
            Either::Left(_) => debug!("event=route_exit module=router nav_id={id} by=signal"),
            Either::Right(_) => debug!("event=route_exit module=router nav_id={id} by=timer"),
        }
    }

    async fn fetch_view(&self, view: &ViewId) -> Result<String, RouteError> {
        let href = self.host.location_href();
        let base = shell_url(&href);
        let url = Url::parse(base)
            .and_then(|base| base.join(view.as_str()))
            .map_err(|err| RouteError::InvalidUrl {
                url: base.to_string(),
                reason: err.to_string(),
            })?;
        let response = self
            .host
            .fetch(FetchRequest {
                url: url.to_string(),
                cache: CacheMode::NoCache,
            })
            .await
            .map_err(|source| RouteError::Fetch {
                view: view.to_string(),
                source,
            })?;
        if !response.is_success() {
            return Err(RouteError::HttpStatus {
                view: view.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn abort(
        &mut self,
        intent: &NavigationIntent,
        view: ViewId,
        error: RouteError,
    ) -> NavigationOutcome {
        error!(
            "event=route_abort module=router status=error nav_id={} view={} error={}",
            intent.id, view, error
        );
        if let Some(body) = self.document.body() {
            self.document.remove_class(body, LEAVING_CLASS);
        }
        self.set_state(TransitionState::Idle, intent.id);
        NavigationOutcome::Aborted { view, error }
    }

    fn set_state(&mut self, next: TransitionState, id: NavigationId) {
        debug!(
            "event=route_state module=router nav_id={} from={} to={}",
            id,
            self.state.as_str(),
            next.as_str()
        );
        self.state = next;
    }

    /// Hash-derived view for a `PopState` event.
    pub(crate) fn popstate_view(&self) -> String {
        location_hash(&self.host.location_href()).to_string()
    }
}
