//! Hero slide carousel bound to a host-provided carousel library.
//!
//! # Responsibility
//! - Build one library instance per `.hero-swiper` element, destroying any
//!   earlier instance for the same element first.
//! - Navigate with left/right half clicks on desktop viewports.
//! - Re-apply the active slide's tone whenever a slide change starts.
//!
//! # Invariants
//! - At most one live instance per element.
//! - The half-click gesture is bound once per element, however often the
//!   view is re-initialized.
//! - A missing library is logged and the feature is skipped.

use super::{ViewInitializer, WidgetContext, WidgetError};
use crate::dom::{Document, NodeId, Selector};
use crate::events::ShellEvent;
use crate::tone::{apply_tone, read_tone};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

static HERO: Lazy<Selector> = Lazy::new(|| Selector::class("hero-swiper"));
static ACTIVE_SLIDE: Lazy<Selector> = Lazy::new(|| Selector::class("swiper-slide-active"));

/// Live instance of the host's slide-carousel library.
pub trait SlideCarousel {
    fn destroy(&mut self, document: &mut Document, remove_styles: bool, clean_styles: bool);
    fn slide_prev(&mut self, document: &mut Document);
    fn slide_next(&mut self, document: &mut Document);
}

/// Constructor side of the slide-carousel library.
pub trait SlideCarouselFactory {
    fn create(
        &mut self,
        document: &mut Document,
        element: NodeId,
        options: &SlideCarouselOptions,
    ) -> Result<Box<dyn SlideCarousel>, WidgetError>;
}

/// Construction options, serialized in the library's own key spelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideCarouselOptions {
    #[serde(rename = "loop")]
    pub loop_slides: bool,
    pub speed: u32,
    pub effect: String,
    pub fade_effect: FadeEffect,
    pub allow_touch_move: bool,
    pub mousewheel: bool,
    pub breakpoints: BTreeMap<u32, SlideBreakpoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FadeEffect {
    pub cross_fade: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideBreakpoint {
    pub allow_touch_move: bool,
}

impl SlideCarouselOptions {
    /// Hero options: looping cross-fade, touch swipes disabled on desktop.
    pub fn hero(desktop_min_width: u32) -> Self {
        Self {
            loop_slides: true,
            speed: 800,
            effect: "fade".to_string(),
            fade_effect: FadeEffect { cross_fade: true },
            allow_touch_move: true,
            mousewheel: false,
            breakpoints: BTreeMap::from([(
                desktop_min_width,
                SlideBreakpoint {
                    allow_touch_move: false,
                },
            )]),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub struct HeroCarousel {
    library: Option<Box<dyn SlideCarouselFactory>>,
    instances: HashMap<NodeId, Box<dyn SlideCarousel>>,
    click_bound: HashSet<NodeId>,
}

impl HeroCarousel {
    pub fn new(library: Option<Box<dyn SlideCarouselFactory>>) -> Self {
        Self {
            library,
            instances: HashMap::new(),
            click_bound: HashSet::new(),
        }
    }

    pub fn has_instance(&self, element: NodeId) -> bool {
        self.instances.contains_key(&element)
    }

    fn apply_slide_tone(document: &mut Document, element: NodeId) {
        let active = document.query_selector(element, &ACTIVE_SLIDE);
        if let Some(token) = read_tone(document, active) {
            apply_tone(document, Some(token.as_str()));
        }
    }

    fn release_detached(&mut self, document: &mut Document) {
        let detached: Vec<NodeId> = self
            .instances
            .keys()
            .copied()
            .filter(|element| !document.is_connected(*element))
            .collect();
        for element in detached {
            if let Some(mut instance) = self.instances.remove(&element) {
                instance.destroy(document, true, true);
            }
        }
        self.click_bound
            .retain(|element| document.is_connected(*element));
    }
}

impl ViewInitializer for HeroCarousel {
    fn name(&self) -> &'static str {
        "hero"
    }

    fn init(&mut self, cx: &mut WidgetContext<'_>, root: NodeId) -> Result<(), WidgetError> {
        self.release_detached(cx.document);
        let Some(element) = cx.document.query_selector(root, &HERO) else {
            return Ok(());
        };
        let Some(library) = self.library.as_mut() else {
            warn!("event=hero_init module=widgets status=skipped reason=library_missing");
            return Ok(());
        };

        if let Some(mut previous) = self.instances.remove(&element) {
            previous.destroy(cx.document, true, true);
            debug!(
                "event=hero_destroy module=widgets element={}",
                element.index()
            );
        }

        let options = SlideCarouselOptions::hero(cx.config.desktop_breakpoint());
        let instance = library.create(cx.document, element, &options)?;

        self.click_bound.insert(element);
        Self::apply_slide_tone(cx.document, element);
        self.instances.insert(element, instance);
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
                let Some(element) = cx.document.closest(*target, &HERO) else {
                    return Ok(());
                };
                if !self.click_bound.contains(&element) || !cx.is_desktop() {
                    return Ok(());
                }
                let Some(instance) = self.instances.get_mut(&element) else {
                    return Ok(());
                };
                let rect = cx.layout.element_rect(cx.document, element);
                if *client_x < rect.center_x() {
                    instance.slide_prev(cx.document);
                } else {
                    instance.slide_next(cx.document);
                }
                Self::apply_slide_tone(cx.document, element);
            }
            ShellEvent::SlideChangeStart { carousel } => {
                if self.instances.contains_key(carousel) {
                    Self::apply_slide_tone(cx.document, *carousel);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
