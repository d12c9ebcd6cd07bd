//! Host environment contracts.
//!
//! # Responsibility
//! - Describe everything the shell needs from the rendering layer: address,
//!   history, fragment fetch, timing, geometry and media playback.
//! - Keep the router and widgets free of any ambient browser globals.
//!
//! # Invariants
//! - Host methods take `&self`; hosts use interior mutability for history and
//!   clocks, matching how browser handles behave.
//! - `sleep` and `fetch` suspend only the awaiting navigation, never the host.

pub mod directory;

use crate::dom::{Document, NodeId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

pub use directory::DirectoryHost;

/// Client-space rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Cache policy for fragment requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Default,
    /// Revalidate with the origin before using any cached copy.
    NoCache,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub cache: CacheMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level fetch failure (no HTTP status available).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Network(String),
    UnsupportedScheme(String),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::UnsupportedScheme(url) => write!(f, "unsupported url scheme: {url}"),
        }
    }
}

impl Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    Unsupported,
    Rejected(String),
}

impl Display for MediaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "media playback is not supported by this host"),
            Self::Rejected(message) => write!(f, "media playback rejected: {message}"),
        }
    }
}

impl Error for MediaError {}

/// Router animation phase reported by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Exit,
    Enter,
}

/// Geometry and media side of the rendering layer. Object safe.
pub trait Layout {
    fn viewport(&self) -> Rect;
    fn element_rect(&self, document: &Document, node: NodeId) -> Rect;
    /// Natural (unclamped) content height of `node`.
    fn scroll_height(&self, document: &Document, node: NodeId) -> f64;

    /// Forces pending style changes to be laid out.
    fn force_layout(&self, _document: &Document, _node: NodeId) {}

    fn set_media_playing(
        &self,
        _document: &Document,
        _node: NodeId,
        _playing: bool,
    ) -> Result<(), MediaError> {
        Err(MediaError::Unsupported)
    }
}

/// Navigation side of the rendering layer.
pub trait ShellHost: Layout {
    /// Full visible address, including any hash.
    fn location_href(&self) -> String;

    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>>;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;

    /// Resolves when the presentation layer finishes the transition for
    /// `phase`. Hosts without that signal never resolve; the router always
    /// bounds this wait with a timer.
    fn transition_finished(&self, _phase: TransitionPhase) -> impl Future<Output = ()> {
        std::future::pending::<()>()
    }

    /// Monotonic time since host start.
    fn now(&self) -> Duration;

    fn push_history(&self, url: &str);
    fn history_len(&self) -> usize;
    fn scroll_to_top(&self);
}

/// Address without its hash fragment.
pub fn shell_url(href: &str) -> &str {
    href.split_once('#').map_or(href, |(base, _)| base)
}

/// Hash fragment including the leading `#`, or `""`.
pub fn location_hash(href: &str) -> &str {
    href.find('#').map_or("", |index| &href[index..])
}
