//! Project info accordion.
//!
//! # Responsibility
//! - Toggle `.project--info--details` panels from their `.info-button`.
//! - Animate `max-height` between `0px` and the measured natural height over
//!   two frames, then drop the override once an open panel settles.
//!
//! # Invariants
//! - Buttons are bound once; rebinding the same view is a no-op.
//! - Closed state is `max-height: 0px` with the `+` glyph.

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{NodeId, Selector};
use crate::events::ShellEvent;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const OWNER: &str = "accordion";
const OPEN_CLASS: &str = "open";
const MAX_HEIGHT: &str = "max-height";
pub const CLOSED_GLYPH: &str = "+";
pub const OPEN_GLYPH: &str = "–";

static BUTTON: Lazy<Selector> = Lazy::new(|| Selector::class("info-button"));
static PROJECT: Lazy<Selector> = Lazy::new(|| Selector::class("project"));
static DETAILS: Lazy<Selector> = Lazy::new(|| Selector::class("project--info--details"));
static ICON: Lazy<Selector> = Lazy::new(|| Selector::class("toggle-icon"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Opening,
    Closing,
}

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    motion: Motion,
    height: f64,
    icon: Option<NodeId>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct Accordion {
    bound: HashSet<NodeId>,
    pending: HashMap<NodeId, PendingFrame>,
    /// Panels waiting for their `max-height` transition end.
    settling: HashSet<NodeId>,
    next_generation: u64,
}

impl Accordion {
    pub fn new() -> Self {
        Self::default()
    }

    fn toggle(&mut self, cx: &mut WidgetContext<'_>, button: NodeId) {
        let Some(details) = cx
            .document
            .closest(button, &PROJECT)
            .and_then(|project| cx.document.query_selector(project, &DETAILS))
        else {
            return;
        };
        let icon = cx.document.query_selector(button, &ICON);
        let height = cx.layout.scroll_height(cx.document, details);

        let motion = if cx.document.has_class(details, OPEN_CLASS) {
            cx.document
                .set_style_property(details, MAX_HEIGHT, &px(height));
            Motion::Closing
        } else {
            cx.document.add_class(details, OPEN_CLASS);
            cx.document.set_style_property(details, MAX_HEIGHT, "0px");
            Motion::Opening
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(
            details,
            PendingFrame {
                motion,
                height,
                icon,
                generation,
            },
        );
        self.settling.insert(details);
        cx.request_frame(OWNER, details, generation);
    }
}

impl ViewInitializer for Accordion {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError> {
        self.bound.retain(|button| cx.document.is_connected(*button));
        self.pending
            .retain(|details, _| cx.document.is_connected(*details));
        self.settling
            .retain(|details| cx.document.is_connected(*details));
        self.bound
            .extend(cx.document.query_selector_all(root, &BUTTON));
        Ok(())
    }

    fn handle_event(
        &mut self,
        cx: &mut WidgetContext<'_>,
        event: &ShellEvent,
    ) -> Result<(), WidgetError> {
        match event {
            ShellEvent::Click { target, .. } => {
                if let Some(button) = cx.document.closest(*target, &BUTTON) {
                    if self.bound.contains(&button) {
                        self.toggle(cx, button);
                    }
                }
            }
            ShellEvent::TransitionEnd { target, property } if property == MAX_HEIGHT => {
                if self.settling.remove(target) && cx.document.has_class(*target, OPEN_CLASS) {
                    cx.document.remove_style_property(*target, MAX_HEIGHT);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_timer(&mut self, cx: &mut WidgetContext<'_>, node: NodeId, generation: u64) {
        let Some(frame) = self.pending.get(&node).copied() else {
            return;
        };
        if frame.generation != generation {
            return;
        }
        self.pending.remove(&node);
        match frame.motion {
            Motion::Opening => {
                cx.document
                    .set_style_property(node, MAX_HEIGHT, &px(frame.height));
                if let Some(icon) = frame.icon {
                    cx.document.set_text_content(icon, OPEN_GLYPH);
                }
            }
            Motion::Closing => {
                cx.document.set_style_property(node, MAX_HEIGHT, "0px");
                cx.document.remove_class(node, OPEN_CLASS);
                if let Some(icon) = frame.icon {
                    cx.document.set_text_content(icon, CLOSED_GLYPH);
                }
            }
        }
    }
}

fn px(value: f64) -> String {
    format!("{}px", value.round())
}
