//! Directory-backed dry-run host.
//!
//! Serves fragments from a local site directory under a `file://` shell URL.
//! Time is virtual: `sleep` advances the clock and resolves immediately. There
//! is no layout engine, so every element reports an empty rect.

use super::{FetchError, FetchRequest, FetchResponse, Layout, Rect, ShellHost};
use crate::dom::{Document, NodeId};
use log::debug;
use std::cell::{Cell, RefCell};
use std::future::{ready, Future};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1440.0,
    height: 900.0,
};

pub struct DirectoryHost {
    root: PathBuf,
    shell_path: PathBuf,
    history: RefCell<Vec<String>>,
    clock: Cell<Duration>,
    viewport: Cell<Rect>,
    scroll_resets: Cell<usize>,
}

impl DirectoryHost {
    /// Opens `site_dir` with `shell_file` (relative to it) as the shell page.
    pub fn new(site_dir: impl AsRef<Path>, shell_file: &str) -> io::Result<Self> {
        let root = site_dir.as_ref().canonicalize()?;
        let shell_path = root.join(shell_file);
        if !shell_path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("shell page not found: {}", shell_path.display()),
            ));
        }
        let shell_url = Url::from_file_path(&shell_path).map_err(|()| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("shell path is not absolute: {}", shell_path.display()),
            )
        })?;

        Ok(Self {
            root,
            shell_path,
            history: RefCell::new(vec![shell_url.to_string()]),
            clock: Cell::new(Duration::ZERO),
            viewport: Cell::new(DEFAULT_VIEWPORT),
            scroll_resets: Cell::new(0),
        })
    }

    pub fn shell_path(&self) -> &Path {
        &self.shell_path
    }

    /// Reads the shell page source.
    pub fn read_shell(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.shell_path)
    }

    pub fn set_viewport(&self, viewport: Rect) {
        self.viewport.set(viewport);
    }

    /// Moves one entry back, like the browser back button. Returns the new
    /// address, or `None` at the first entry.
    pub fn go_back(&self) -> Option<String> {
        let mut history = self.history.borrow_mut();
        if history.len() < 2 {
            return None;
        }
        history.pop();
        history.last().cloned()
    }

    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.get()
    }

    fn read(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let url =
            Url::parse(&request.url).map_err(|err| FetchError::Network(err.to_string()))?;
        if url.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme(request.url.clone()));
        }
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::Network(format!("not a local path: {url}")))?;
        if !path.starts_with(&self.root) {
            return Ok(FetchResponse {
                status: 403,
                body: String::new(),
            });
        }
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: String::new(),
            }),
            Err(err) => Err(FetchError::Network(err.to_string())),
        }
    }
}

impl Layout for DirectoryHost {
    fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    fn element_rect(&self, _document: &Document, _node: NodeId) -> Rect {
        Rect::default()
    }

    fn scroll_height(&self, _document: &Document, _node: NodeId) -> f64 {
        0.0
    }
}

impl ShellHost for DirectoryHost {
    fn location_href(&self) -> String {
        self.history.borrow().last().cloned().unwrap_or_default()
    }

    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> {
        debug!("event=host_fetch module=host url={}", request.url);
        ready(self.read(&request))
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        self.clock.set(self.clock.get() + duration);
        ready(())
    }

    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn push_history(&self, url: &str) {
        self.history.borrow_mut().push(url.to_string());
    }

    fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    fn scroll_to_top(&self) {
        self.scroll_resets.set(self.scroll_resets.get() + 1);
    }
}
