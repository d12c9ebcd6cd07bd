//! Core of the single-page view shell.
//! All routing, tone and widget semantics live here; hosts only supply the
//! rendering layer through `host::ShellHost`.

pub mod config;
pub mod dom;
pub mod events;
pub mod host;
pub mod logging;
pub mod router;
pub mod shell;
pub mod timer;
pub mod tone;
pub mod widgets;

pub use config::{ConfigError, ShellConfig};
pub use dom::{Document, NodeId, Selector, SelectorError};
pub use events::{DispatchOutcome, ShellEvent};
pub use host::{
    CacheMode, DirectoryHost, FetchError, FetchRequest, FetchResponse, Layout, MediaError, Rect,
    ShellHost, TransitionPhase,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use router::{
    NavigationId, NavigationIntent, NavigationOutcome, RouteError, TransitionState, ViewId,
};
pub use shell::Shell;
pub use timer::{TimerAction, TimerQueue};
pub use tone::{apply_tone, read_tone, Tone};
pub use widgets::{
    InitFailure, RegistryError, SlideCarousel, SlideCarouselFactory, SlideCarouselOptions,
    ViewInitializer, WidgetContext, WidgetError, WidgetRegistry,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
