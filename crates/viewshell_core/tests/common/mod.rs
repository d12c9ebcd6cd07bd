#![allow(dead_code)]

use futures::future::Either;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::{pending, ready, Future};
use std::rc::Rc;
use std::time::Duration;
use viewshell_core::{
    Document, FetchError, FetchRequest, FetchResponse, Layout, MediaError, NodeId, Rect, Selector,
    Shell, ShellConfig, ShellHost, SlideCarousel, SlideCarouselFactory, SlideCarouselOptions,
    TransitionPhase, WidgetError, WidgetRegistry,
};

pub const ORIGIN: &str = "https://site.test/";
pub const SHELL_HREF: &str = "https://site.test/index.html";

pub const SHELL_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Studio</title></head>
  <body class="splash-lock">
    <div id="splash"><span id="splash-logo">Studio</span></div>
    <header>
      <a id="nav-about" data-route href="views/about.html">About</a>
      <a id="nav-work" data-route href="/views/work.html"><span id="nav-work-label">Work</span></a>
      <a id="nav-mail" href="mailto:hello@site.test">Mail</a>
      <a id="nav-plain" href="views/about.html">Plain</a>
    </header>
    <div id="view"></div>
    <div id="cursor-label"></div>
  </body>
</html>"#;

enum Page {
    Body(u16, String),
    NetworkError,
}

/// Suspending host calls in the order the shell made them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Sleep(Duration),
    Fetch(String),
}

/// In-memory browser stand-in with a virtual clock.
pub struct FakeHost {
    pages: RefCell<HashMap<String, Page>>,
    href: RefCell<String>,
    history: RefCell<Vec<String>>,
    clock: Cell<Duration>,
    viewport: Cell<Rect>,
    rects: RefCell<HashMap<String, Rect>>,
    heights: RefCell<HashMap<String, f64>>,
    media: RefCell<Vec<(String, bool)>>,
    requests: RefCell<Vec<FetchRequest>>,
    sleeps: RefCell<Vec<Duration>>,
    calls: RefCell<Vec<HostCall>>,
    scroll_resets: Cell<usize>,
    layout_flushes: Cell<usize>,
    exit_signal: Cell<bool>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::at(SHELL_HREF)
    }

    pub fn at(href: &str) -> Self {
        Self {
            pages: RefCell::new(HashMap::new()),
            href: RefCell::new(href.to_string()),
            history: RefCell::new(vec![href.to_string()]),
            clock: Cell::new(Duration::ZERO),
            viewport: Cell::new(Rect::new(0.0, 0.0, 1440.0, 900.0)),
            rects: RefCell::new(HashMap::new()),
            heights: RefCell::new(HashMap::new()),
            media: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
            sleeps: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            scroll_resets: Cell::new(0),
            layout_flushes: Cell::new(0),
            exit_signal: Cell::new(false),
        }
    }

    /// Serves `html` at `path` relative to the origin.
    pub fn with_page(self, path: &str, html: &str) -> Self {
        self.pages
            .borrow_mut()
            .insert(format!("{ORIGIN}{path}"), Page::Body(200, html.to_string()));
        self
    }

    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.pages
            .borrow_mut()
            .insert(format!("{ORIGIN}{path}"), Page::Body(status, String::new()));
        self
    }

    pub fn with_network_error(self, path: &str) -> Self {
        self.pages
            .borrow_mut()
            .insert(format!("{ORIGIN}{path}"), Page::NetworkError);
        self
    }

    pub fn with_exit_signal(self) -> Self {
        self.exit_signal.set(true);
        self
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.viewport.set(Rect::new(0.0, 0.0, width, height));
    }

    /// Rect reported for the element with `id`.
    pub fn set_rect(&self, id: &str, rect: Rect) {
        self.rects.borrow_mut().insert(id.to_string(), rect);
    }

    pub fn set_scroll_height(&self, id: &str, height: f64) {
        self.heights.borrow_mut().insert(id.to_string(), height);
    }

    /// Simulates browser back: drops the newest entry and moves the address.
    pub fn go_back(&self) {
        let mut history = self.history.borrow_mut();
        if history.len() > 1 {
            history.pop();
        }
        if let Some(last) = history.last() {
            *self.href.borrow_mut() = last.clone();
        }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }

    pub fn href(&self) -> String {
        self.href.borrow().clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn media_log(&self) -> Vec<(String, bool)> {
        self.media.borrow().clone()
    }

    pub fn clear_media_log(&self) {
        self.media.borrow_mut().clear();
    }

    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.get()
    }

    pub fn layout_flushes(&self) -> usize {
        self.layout_flushes.get()
    }
}

fn element_key(document: &Document, node: NodeId) -> String {
    document.attribute(node, "id").unwrap_or_default().to_string()
}

impl Layout for FakeHost {
    fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    fn element_rect(&self, document: &Document, node: NodeId) -> Rect {
        self.rects
            .borrow()
            .get(&element_key(document, node))
            .copied()
            .unwrap_or_default()
    }

    fn scroll_height(&self, document: &Document, node: NodeId) -> f64 {
        self.heights
            .borrow()
            .get(&element_key(document, node))
            .copied()
            .unwrap_or(0.0)
    }

    fn force_layout(&self, _document: &Document, _node: NodeId) {
        self.layout_flushes.set(self.layout_flushes.get() + 1);
    }

    fn set_media_playing(
        &self,
        document: &Document,
        node: NodeId,
        playing: bool,
    ) -> Result<(), MediaError> {
        self.media
            .borrow_mut()
            .push((element_key(document, node), playing));
        Ok(())
    }
}

impl ShellHost for FakeHost {
    fn location_href(&self) -> String {
        self.href.borrow().clone()
    }

    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        let result = match self.pages.borrow().get(&request.url) {
            Some(Page::Body(status, body)) => Ok(FetchResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Page::NetworkError) => Err(FetchError::Network("connection reset".to_string())),
            None => Ok(FetchResponse {
                status: 404,
                body: "<html><body><h1>Not found</h1></body></html>".to_string(),
            }),
        };
        self.calls
            .borrow_mut()
            .push(HostCall::Fetch(request.url.clone()));
        self.requests.borrow_mut().push(request);
        ready(result)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        async move {
            self.sleeps.borrow_mut().push(duration);
            self.calls.borrow_mut().push(HostCall::Sleep(duration));
            self.clock.set(self.clock.get() + duration);
        }
    }

    fn transition_finished(&self, _phase: TransitionPhase) -> impl Future<Output = ()> {
        if self.exit_signal.get() {
            Either::Left(ready(()))
        } else {
            Either::Right(pending::<()>())
        }
    }

    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn push_history(&self, url: &str) {
        self.history.borrow_mut().push(url.to_string());
        *self.href.borrow_mut() = url.to_string();
    }

    fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    fn scroll_to_top(&self) {
        self.scroll_resets.set(self.scroll_resets.get() + 1);
    }
}

/// Records what the hero carousel asked of the slide library.
#[derive(Debug, Default)]
pub struct SwiperLog {
    pub created: Vec<NodeId>,
    pub destroyed: Vec<NodeId>,
    pub options: Vec<SlideCarouselOptions>,
}

pub struct FakeSwiperFactory {
    log: Rc<RefCell<SwiperLog>>,
}

impl FakeSwiperFactory {
    pub fn new() -> (Self, Rc<RefCell<SwiperLog>>) {
        let log = Rc::new(RefCell::new(SwiperLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl SlideCarouselFactory for FakeSwiperFactory {
    fn create(
        &mut self,
        document: &mut Document,
        element: NodeId,
        options: &SlideCarouselOptions,
    ) -> Result<Box<dyn SlideCarousel>, WidgetError> {
        let slides = slides(document, element);
        let has_active = slides
            .iter()
            .any(|slide| document.has_class(*slide, "swiper-slide-active"));
        if let (false, Some(first)) = (has_active, slides.first()) {
            document.add_class(*first, "swiper-slide-active");
        }
        let mut log = self.log.borrow_mut();
        log.created.push(element);
        log.options.push(options.clone());
        Ok(Box::new(FakeSwiper {
            element,
            log: self.log.clone(),
        }))
    }
}

struct FakeSwiper {
    element: NodeId,
    log: Rc<RefCell<SwiperLog>>,
}

impl FakeSwiper {
    fn shift(&self, document: &mut Document, delta: isize) {
        let slides = slides(document, self.element);
        if slides.is_empty() {
            return;
        }
        let current = slides
            .iter()
            .position(|slide| document.has_class(*slide, "swiper-slide-active"))
            .unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(slides.len() as isize) as usize;
        document.remove_class(slides[current], "swiper-slide-active");
        document.add_class(slides[next], "swiper-slide-active");
    }
}

impl SlideCarousel for FakeSwiper {
    fn destroy(&mut self, _document: &mut Document, _remove_styles: bool, _clean_styles: bool) {
        self.log.borrow_mut().destroyed.push(self.element);
    }

    fn slide_prev(&mut self, document: &mut Document) {
        self.shift(document, -1);
    }

    fn slide_next(&mut self, document: &mut Document) {
        self.shift(document, 1);
    }
}

/// Slide library that refuses every element.
pub struct BrokenSwiperFactory;

impl SlideCarouselFactory for BrokenSwiperFactory {
    fn create(
        &mut self,
        _document: &mut Document,
        _element: NodeId,
        _options: &SlideCarouselOptions,
    ) -> Result<Box<dyn SlideCarousel>, WidgetError> {
        Err(WidgetError::Library("constructor threw".to_string()))
    }
}

fn slides(document: &Document, element: NodeId) -> Vec<NodeId> {
    document.query_selector_all(element, &Selector::class("swiper-slide"))
}

pub fn shell_document() -> Document {
    Document::parse_html(SHELL_HTML)
}

pub fn shell(host: FakeHost) -> Shell<FakeHost> {
    Shell::new(
        ShellConfig::default(),
        host,
        shell_document(),
        WidgetRegistry::with_defaults(None),
    )
}

pub fn shell_with_swiper(host: FakeHost) -> (Shell<FakeHost>, Rc<RefCell<SwiperLog>>) {
    let (factory, log) = FakeSwiperFactory::new();
    let shell = Shell::new(
        ShellConfig::default(),
        host,
        shell_document(),
        WidgetRegistry::with_defaults(Some(Box::new(factory))),
    );
    (shell, log)
}

pub fn by_id(shell: &Shell<FakeHost>, id: &str) -> NodeId {
    shell
        .document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("element #{id} should exist"))
}

pub fn mount_html(shell: &Shell<FakeHost>) -> String {
    let mount = shell.mount().expect("mount point");
    shell.document().inner_html(mount)
}

/// Wraps `inner` into a fragment document with a marked view container.
pub fn view_page(name: &str, attrs: &str, inner: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{name}</title></head><body>\
         <main data-view=\"{name}\" {attrs}>{inner}</main></body></html>"
    )
}
