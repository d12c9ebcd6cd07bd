//! Floating "Previous"/"Next" cursor label over carousel zones (desktop only).

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{NodeId, Selector};
use crate::events::ShellEvent;
use once_cell::sync::Lazy;

const LABEL_ID: &str = "cursor-label";
const VISIBLE_CLASS: &str = "is-visible";
const OFF_CLASS: &str = "is-off";
const BODY_CLASS: &str = "has-text-cursor";
pub const PREVIOUS_TEXT: &str = "Previous";
pub const NEXT_TEXT: &str = "Next";

static TEXT: Lazy<Selector> = Lazy::new(|| Selector::class("cursor-text"));
static ZONES: Lazy<Selector> = Lazy::new(|| {
    Selector::any_of([Selector::class("hero-swiper"), Selector::class("carousel")])
});
static EXEMPT: Lazy<Selector> = Lazy::new(|| Selector::class("nocursor"));

#[derive(Debug, Default)]
pub struct CursorLabel {
    enabled: bool,
    label: Option<NodeId>,
    text: Option<NodeId>,
}

impl CursorLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resets the label and re-checks the desktop breakpoint.
    fn rebuild(&mut self, cx: &mut WidgetContext<'_>) {
        self.enabled = false;
        self.text = None;
        self.label = cx.document.get_element_by_id(LABEL_ID);
        let Some(label) = self.label else {
            return;
        };
        self.hide(cx);
        if !cx.is_desktop() {
            return;
        }

        let text = match cx.document.query_selector(label, &TEXT) {
            Some(text) => text,
            None => {
                let text = cx.document.create_element("span");
                cx.document.set_attribute(text, "class", "cursor-text");
                cx.document.append_child(label, text);
                text
            }
        };
        self.text = Some(text);
        self.enabled = true;
    }

    fn hide(&self, cx: &mut WidgetContext<'_>) {
        if let Some(label) = self.label {
            cx.document.remove_class(label, VISIBLE_CLASS);
        }
        if let Some(body) = cx.document.body() {
            cx.document.remove_class(body, BODY_CLASS);
        }
    }

    fn follow(
        &self,
        cx: &mut WidgetContext<'_>,
        client_x: f64,
        client_y: f64,
        hovered: Option<NodeId>,
    ) {
        let (Some(label), Some(text)) = (self.label, self.text) else {
            return;
        };
        let Some((hovered, zone)) =
            hovered.and_then(|node| cx.document.closest(node, &ZONES).map(|zone| (node, zone)))
        else {
            self.hide(cx);
            return;
        };

        let offset = cx.config.cursor_offset_px;
        cx.document
            .set_style_property(label, "left", &format!("{}px", client_x + offset));
        cx.document
            .set_style_property(label, "top", &format!("{}px", client_y + offset));
        cx.document.add_class(label, VISIBLE_CLASS);
        if let Some(body) = cx.document.body() {
            cx.document.add_class(body, BODY_CLASS);
        }

        let rect = cx.layout.element_rect(cx.document, zone);
        let caption = if client_x < rect.center_x() {
            PREVIOUS_TEXT
        } else {
            NEXT_TEXT
        };
        cx.document.set_text_content(text, caption);

        let exempt = cx.document.closest(hovered, &EXEMPT).is_some();
        cx.document.toggle_class(label, OFF_CLASS, exempt);
    }
}

impl ViewInitializer for CursorLabel {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, _root: NodeId) -> Result<(), WidgetError> {
        self.rebuild(cx);
        Ok(())
    }

    fn handle_event(
        &mut self,
        cx: &mut WidgetContext<'_>,
        event: &ShellEvent,
    ) -> Result<(), WidgetError> {
        match event {
            ShellEvent::PointerMove {
                client_x,
                client_y,
                hovered,
            } if self.enabled => self.follow(cx, *client_x, *client_y, *hovered),
            ShellEvent::PointerLeave => self.hide(cx),
            ShellEvent::Resize => self.rebuild(cx),
            _ => {}
        }
        Ok(())
    }
}
