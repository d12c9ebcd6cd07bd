//! Media carousels: click halves to step through `img`/`video` items.
//!
//! # Responsibility
//! - Track the current item per `.carousel` and mirror it in the `active`
//!   class, video playback and the project's `NN/NN` counter.
//! - Lock stepping while the incoming item fades in.
//!
//! # Invariants
//! - Indices wrap modulo the item count.
//! - A click while `is-animating` is set does nothing.
//! - The lock is released by the incoming item's `opacity` transition end or
//!   by the fallback timer, whichever fires first; the other is a no-op.

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{Document, NodeId, Selector};
use crate::events::ShellEvent;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const OWNER: &str = "carousel";
const ACTIVE_CLASS: &str = "active";
const ANIMATING_CLASS: &str = "is-animating";

static CAROUSEL: Lazy<Selector> = Lazy::new(|| Selector::class("carousel"));
static ITEMS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img, video").expect("valid carousel item selector")
});
static INTERACTIVE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a, button, input, textarea, select").expect("valid interactive selector")
});
static PROJECT: Lazy<Selector> = Lazy::new(|| Selector::class("project"));
static COUNTER: Lazy<Selector> = Lazy::new(|| Selector::class("carousel-counter"));

#[derive(Debug)]
struct CarouselState {
    items: Vec<NodeId>,
    current: usize,
    total: usize,
    counter: Option<NodeId>,
    /// Incoming item and generation of the running transition.
    transition: Option<(NodeId, u64)>,
}

#[derive(Debug, Default)]
pub struct MediaCarousel {
    bound: HashSet<NodeId>,
    states: HashMap<NodeId, CarouselState>,
    next_generation: u64,
}

impl MediaCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index of the carousel rooted at `carousel`.
    pub fn current_index(&self, carousel: NodeId) -> Option<usize> {
        self.states.get(&carousel).map(|state| state.current)
    }

    fn bind(&mut self, cx: &mut WidgetContext<'_>, carousel: NodeId) {
        let items = cx.document.query_selector_all(carousel, &ITEMS);
        if items.len() < 2 {
            return;
        }
        let current = items
            .iter()
            .position(|item| cx.document.has_class(*item, ACTIVE_CLASS))
            .unwrap_or(0);
        for (index, item) in items.iter().enumerate() {
            cx.document.toggle_class(*item, ACTIVE_CLASS, index == current);
        }

        let counter = cx
            .document
            .closest(carousel, &PROJECT)
            .and_then(|project| cx.document.query_selector(project, &COUNTER));
        let total = declared_total(cx.document, carousel).unwrap_or(items.len());

        let state = CarouselState {
            items,
            current,
            total,
            counter,
            transition: None,
        };
        sync_media(cx, &state);
        update_counter(cx.document, &state);
        self.states.insert(carousel, state);
    }

    fn step(&mut self, cx: &mut WidgetContext<'_>, carousel: NodeId, delta: isize) {
        if cx.document.has_class(carousel, ANIMATING_CLASS) {
            return;
        }
        let Some(state) = self.states.get_mut(&carousel) else {
            return;
        };
        let len = state.items.len() as isize;
        let next = (state.current as isize + delta).rem_euclid(len) as usize;
        if next == state.current {
            return;
        }

        cx.document.add_class(carousel, ANIMATING_CLASS);
        let from = state.items[state.current];
        let to = state.items[next];
        cx.document.remove_class(from, ACTIVE_CLASS);
        cx.document.add_class(to, ACTIVE_CLASS);

        self.next_generation += 1;
        let generation = self.next_generation;
        state.transition = Some((to, generation));
        let fallback = cx.config.carousel_fallback();
        cx.set_timeout(fallback, OWNER, carousel, generation);

        state.current = next;
        update_counter(cx.document, state);
        sync_media(cx, state);
        debug!(
            "event=carousel_step module=widgets carousel={} index={}",
            carousel.index(),
            next
        );
    }

    fn finish(document: &mut Document, carousel: NodeId, state: &mut CarouselState) {
        state.transition = None;
        document.remove_class(carousel, ANIMATING_CLASS);
    }
}

impl ViewInitializer for MediaCarousel {
    fn name(&self) -> &'static str {
        OWNER
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError> {
        self.bound.retain(|carousel| cx.document.is_connected(*carousel));
        self.states
            .retain(|carousel, _| cx.document.is_connected(*carousel));

        for carousel in cx.document.query_selector_all(root, &CAROUSEL) {
            if !self.bound.insert(carousel) {
                continue;
            }
            self.bind(cx, carousel);
        }
        Ok(())
    }

    fn handle_event(
        &mut self,
        cx: &mut WidgetContext<'_>,
        event: &ShellEvent,
    ) -> Result<(), WidgetError> {
        match event {
            ShellEvent::Click {
                target, client_x, ..
            } => {
                let Some(carousel) = cx.document.closest(*target, &CAROUSEL) else {
                    return Ok(());
                };
                if !self.states.contains_key(&carousel)
                    || cx.document.closest(*target, &INTERACTIVE).is_some()
                {
                    return Ok(());
                }
                let rect = cx.layout.element_rect(cx.document, carousel);
                let delta = if *client_x < rect.center_x() { -1 } else { 1 };
                self.step(cx, carousel, delta);
            }
            ShellEvent::TransitionEnd { target, property } if property == "opacity" => {
                let running = self.states.iter_mut().find(|(_, state)| {
                    matches!(state.transition, Some((item, _)) if item == *target)
                });
                if let Some((carousel, state)) = running {
                    Self::finish(cx.document, *carousel, state);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_timer(&mut self, cx: &mut WidgetContext<'_>, node: NodeId, generation: u64) {
        let Some(state) = self.states.get_mut(&node) else {
            return;
        };
        if matches!(state.transition, Some((_, current)) if current == generation) {
            Self::finish(cx.document, node, state);
        }
    }
}

/// Zero-padded to at least two digits.
fn pad2(value: usize) -> String {
    format!("{value:02}")
}

fn declared_total(document: &Document, carousel: NodeId) -> Option<usize> {
    ["data-total", "data-count"].iter().find_map(|name| {
        document
            .attribute(carousel, name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|total| *total > 0)
    })
}

fn update_counter(document: &mut Document, state: &CarouselState) {
    if let Some(counter) = state.counter {
        let text = format!("{}/{}", pad2(state.current + 1), pad2(state.total));
        document.set_text_content(counter, &text);
    }
}

fn sync_media(cx: &mut WidgetContext<'_>, state: &CarouselState) {
    for (index, item) in state.items.iter().enumerate() {
        if cx.document.tag_name(*item) == Some("video") {
            cx.set_media_playing(*item, index == state.current);
        }
    }
}
