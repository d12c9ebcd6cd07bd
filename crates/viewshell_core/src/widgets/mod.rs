//! Per-view widget initializers and their registry.
//!
//! # Responsibility
//! - Define the initializer contract the router invokes after every swap.
//! - Route host events and widget-owned timers to the owning initializer.
//!
//! # Invariants
//! - Initializers run in registration order; a failing one never stops the rest.
//! - Initialization state lives in each initializer's own side table keyed by
//!   `NodeId`, never on the DOM nodes themselves.
//! - Re-running `init` on the same subtree is idempotent.
//!
//! # See also
//! - `crate::router` (the only caller of `init_all` during navigation)

pub mod accordion;
pub mod carousel;
pub mod cursor;
pub mod hero;
pub mod reveal;
pub mod view_tone;

use crate::config::ShellConfig;
use crate::dom::{Document, NodeId};
use crate::events::ShellEvent;
use crate::host::{Layout, MediaError};
use crate::timer::{TimerAction, TimerQueue};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub use accordion::Accordion;
pub use carousel::MediaCarousel;
pub use cursor::CursorLabel;
pub use hero::{
    FadeEffect, HeroCarousel, SlideBreakpoint, SlideCarousel, SlideCarouselFactory,
    SlideCarouselOptions,
};
pub use reveal::{intersection_ratio, RevealOnScroll};
pub use view_tone::ViewTone;

/// Borrowed shell state handed to initializers.
pub struct WidgetContext<'a> {
    pub document: &'a mut Document,
    pub layout: &'a dyn Layout,
    pub config: &'a ShellConfig,
    timers: &'a mut TimerQueue,
    now: Duration,
}

impl<'a> WidgetContext<'a> {
    pub fn new(
        document: &'a mut Document,
        layout: &'a dyn Layout,
        config: &'a ShellConfig,
        timers: &'a mut TimerQueue,
        now: Duration,
    ) -> Self {
        Self {
            document,
            layout,
            config,
            timers,
            now,
        }
    }

    /// Viewport at least as wide as the desktop breakpoint.
    pub fn is_desktop(&self) -> bool {
        self.layout.viewport().width >= self.config.desktop_min_width
    }

    pub fn set_timeout(
        &mut self,
        delay: Duration,
        owner: &'static str,
        node: NodeId,
        generation: u64,
    ) {
        self.timers.schedule(
            self.now,
            delay,
            TimerAction::Widget {
                owner,
                node,
                generation,
            },
        );
    }

    pub fn request_frame(&mut self, owner: &'static str, node: NodeId, generation: u64) {
        self.timers.request_frame(TimerAction::Widget {
            owner,
            node,
            generation,
        });
    }

    /// Starts or stops playback; failures are logged and ignored.
    pub fn set_media_playing(&mut self, node: NodeId, playing: bool) {
        if let Err(err) = self.layout.set_media_playing(self.document, node, playing) {
            debug!(
                "event=media_toggle module=widgets status=ignored node={} playing={} error={}",
                node.index(),
                playing,
                err
            );
        }
    }
}

/// Contract for one per-view behavior.
pub trait ViewInitializer {
    /// Stable registry name; also the owner tag of the initializer's timers.
    fn name(&self) -> &'static str;

    /// Binds behavior to `root` (the mount point). Must tolerate re-runs.
    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError>;

    fn handle_event(
        &mut self,
        _cx: &mut WidgetContext<'_>,
        _event: &ShellEvent,
    ) -> Result<(), WidgetError> {
        Ok(())
    }

    /// Timer or animation frame previously requested by this initializer.
    fn on_timer(&mut self, _cx: &mut WidgetContext<'_>, _node: NodeId, _generation: u64) {}
}

/// Widget initialization or event-handling failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The slide-carousel library refused to build an instance.
    Library(String),
    Media(MediaError),
    /// Markup the widget depends on is malformed.
    Markup(String),
}

impl Display for WidgetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Library(message) => write!(f, "carousel library error: {message}"),
            Self::Media(err) => write!(f, "{err}"),
            Self::Markup(message) => write!(f, "unexpected markup: {message}"),
        }
    }
}

impl Error for WidgetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Media(err) => Some(err),
            _ => None,
        }
    }
}

/// One isolated initializer failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitFailure {
    pub initializer: &'static str,
    pub error: WidgetError,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName(String),
    DuplicateName(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "initializer name is invalid: {value}"),
            Self::DuplicateName(value) => {
                write!(f, "initializer name already registered: {value}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Ordered initializer registry held by the shell.
#[derive(Default)]
pub struct WidgetRegistry {
    entries: Vec<Box<dyn ViewInitializer>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in initializers in their required order: view tone first so a
    /// hero slide can override it.
    pub fn with_defaults(slide_carousels: Option<Box<dyn SlideCarouselFactory>>) -> Self {
        Self {
            entries: vec![
                Box::new(ViewTone::new()),
                Box::new(HeroCarousel::new(slide_carousels)),
                Box::new(MediaCarousel::new()),
                Box::new(Accordion::new()),
                Box::new(RevealOnScroll::new()),
                Box::new(CursorLabel::new()),
            ],
        }
    }

    pub fn register(
        &mut self,
        initializer: Box<dyn ViewInitializer>,
    ) -> Result<(), RegistryError> {
        let name = initializer.name();
        if !is_valid_initializer_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.entries.iter().any(|entry| entry.name() == name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.entries.push(initializer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    /// Runs every initializer against `root`, isolating failures.
    pub fn init_all(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Vec<InitFailure> {
        let mut failures = Vec::new();
        for entry in &mut self.entries {
            if let Err(error) = entry.init(cx, root) {
                error!(
                    "event=widget_init module=widgets status=error initializer={} error={}",
                    entry.name(),
                    error
                );
                failures.push(InitFailure {
                    initializer: entry.name(),
                    error,
                });
            }
        }
        failures
    }

    /// Offers `event` to every initializer, isolating failures.
    pub fn dispatch(&mut self, cx: &mut WidgetContext<'_>, event: &ShellEvent) {
        for entry in &mut self.entries {
            if let Err(error) = entry.handle_event(cx, event) {
                error!(
                    "event=widget_event module=widgets status=error initializer={} error={}",
                    entry.name(),
                    error
                );
            }
        }
    }

    /// Delivers a widget timer to its owner. Unknown owners are dropped.
    pub fn fire_timer(
        &mut self,
        cx: &mut WidgetContext<'_>,
        owner: &str,
        node: NodeId,
        generation: u64,
    ) {
        match self.entries.iter_mut().find(|entry| entry.name() == owner) {
            Some(entry) => entry.on_timer(cx, node, generation),
            None => debug!("event=widget_timer module=widgets status=dropped owner={owner}"),
        }
    }
}

fn is_valid_initializer_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
