//! Reveal-on-scroll for `.project` items.
//!
//! An item gets `inview` the first time at least `reveal_threshold` of its
//! area lies inside the viewport shrunk by the bottom root margin; it is then
//! no longer observed. The observed set is rebuilt on every view swap.

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{NodeId, Selector};
use crate::events::ShellEvent;
use crate::host::Rect;
use log::debug;
use once_cell::sync::Lazy;

const INVIEW_CLASS: &str = "inview";

static ITEM: Lazy<Selector> = Lazy::new(|| Selector::class("project"));

/// Visible fraction of `target` inside `root`. Empty targets count as fully
/// visible when they touch `root`.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    let Some(overlap) = target.intersection(root) else {
        return 0.0;
    };
    let area = target.area();
    if area <= 0.0 {
        return 1.0;
    }
    overlap.area() / area
}

#[derive(Debug, Default)]
pub struct RevealOnScroll {
    observed: Vec<NodeId>,
}

impl RevealOnScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observed(&self) -> &[NodeId] {
        &self.observed
    }

    fn root_box(cx: &WidgetContext<'_>) -> Rect {
        let viewport = cx.layout.viewport();
        let margin = viewport.height * cx.config.reveal_bottom_margin_pct / 100.0;
        Rect::new(
            viewport.x,
            viewport.y,
            viewport.width,
            (viewport.height - margin).max(0.0),
        )
    }

    fn evaluate(&mut self, cx: &mut WidgetContext<'_>) {
        if self.observed.is_empty() {
            return;
        }
        let root = Self::root_box(cx);
        let threshold = cx.config.reveal_threshold;
        let mut revealed = 0usize;
        self.observed.retain(|item| {
            if !cx.document.is_connected(*item) {
                return false;
            }
            let rect = cx.layout.element_rect(cx.document, *item);
            let ratio = intersection_ratio(&rect, &root);
            if ratio > 0.0 && ratio >= threshold {
                cx.document.add_class(*item, INVIEW_CLASS);
                revealed += 1;
                return false;
            }
            true
        });
        if revealed > 0 {
            debug!(
                "event=reveal module=widgets revealed={} remaining={}",
                revealed,
                self.observed.len()
            );
        }
    }
}

impl ViewInitializer for RevealOnScroll {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError> {
        self.observed.clear();
        self.observed = cx
            .document
            .query_selector_all(root, &ITEM)
            .into_iter()
            .filter(|item| !cx.document.has_class(*item, INVIEW_CLASS))
            .collect();
        self.evaluate(cx);
        Ok(())
    }

    fn handle_event(
        &mut self,
        cx: &mut WidgetContext<'_>,
        event: &ShellEvent,
    ) -> Result<(), WidgetError> {
        if matches!(event, ShellEvent::Scroll | ShellEvent::Resize) {
            self.evaluate(cx);
        }
        Ok(())
    }
}
