//! Host-forwarded input events.

use crate::dom::NodeId;

/// Event delivered by the host to [`crate::Shell::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    Click {
        target: NodeId,
        client_x: f64,
        client_y: f64,
    },
    PointerMove {
        client_x: f64,
        client_y: f64,
        /// Topmost element under the pointer, as hit-tested by the host.
        hovered: Option<NodeId>,
    },
    PointerLeave,
    Resize,
    Scroll,
    TransitionEnd {
        target: NodeId,
        property: String,
    },
    /// Emitted by the slide-carousel library when a slide change starts.
    SlideChangeStart {
        carousel: NodeId,
    },
    /// Browser back/forward.
    PopState,
}

impl ShellEvent {
    pub fn click(target: NodeId, client_x: f64) -> Self {
        Self::Click {
            target,
            client_x,
            client_y: 0.0,
        }
    }

    pub fn transition_end(target: NodeId, property: &str) -> Self {
        Self::TransitionEnd {
            target,
            property: property.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The host must suppress the browser's default action.
    pub default_prevented: bool,
}
