//! Baseline tone from the injected view container.

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{NodeId, Selector};
use crate::tone::{apply_tone, read_tone};

/// Applies the tone declared on `main[<view attribute>]`, if any. Registered
/// ahead of the hero carousel so a slide tone can override it.
#[derive(Debug, Default)]
pub struct ViewTone;

impl ViewTone {
    pub fn new() -> Self {
        Self
    }
}

impl ViewInitializer for ViewTone {
    fn name(&self) -> &'static str {
        "view_tone"
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError> {
        let container = Selector::tag("main").with_attribute(&cx.config.view_attribute);
        let main = cx.document.query_selector(root, &container);
        if let Some(token) = read_tone(cx.document, main) {
            apply_tone(cx.document, Some(token.as_str()));
        }
        Ok(())
    }
}
