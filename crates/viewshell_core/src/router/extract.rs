//! View container extraction from fetched fragment documents.
//!
//! Preferred: `main[<view attribute>]`. Fallbacks, in order: the legacy
//! `#<legacy id>` container, the first `<main>`, then `<body>`. A fallback's
//! children are wrapped into a synthesized `main` tagged with the fragment's
//! derived name.

use super::path::ViewId;
use crate::config::ShellConfig;
use crate::dom::{Document, NodeId, Selector};

/// Extracted view container, owned by its parsed document.
#[derive(Debug, Clone)]
pub struct ViewFragment {
    pub document: Document,
    pub root: NodeId,
    pub name: String,
    /// `true` when the container was built from a fallback.
    pub synthesized: bool,
}

impl ViewFragment {
    pub fn inner_html(&self) -> String {
        self.document.inner_html(self.root)
    }
}

/// Locates (or synthesizes) the view container. `None` when the document has
/// nothing usable at all.
pub fn extract_view(html: &str, view: &ViewId, config: &ShellConfig) -> Option<ViewFragment> {
    let mut document = Document::parse_html(html);
    let scope = document.root();

    let preferred = Selector::tag("main").with_attribute(&config.view_attribute);
    if let Some(root) = document.query_selector(scope, &preferred) {
        let name = document
            .attribute(root, &config.view_attribute)
            .unwrap_or_default()
            .to_string();
        return Some(ViewFragment {
            document,
            root,
            name,
            synthesized: false,
        });
    }

    let fallback = document
        .query_selector(scope, &Selector::id(&config.legacy_container_id))
        .or_else(|| document.query_selector(scope, &Selector::tag("main")))
        .or_else(|| document.body())?;

    let name = view.derived_name(&config.fragment_extension);
    let wrapper = document.create_element("main");
    document.set_attribute(wrapper, &config.view_attribute, &name);
    let children = document.children(fallback).to_vec();
    for child in children {
        if let Some(copy) = document.clone_subtree(child) {
            document.append_child(wrapper, copy);
        }
    }

    Some(ViewFragment {
        document,
        root: wrapper,
        name,
        synthesized: true,
    })
}

#[cfg(test)]
mod tests {
    use super::extract_view;
    use crate::config::ShellConfig;
    use crate::router::path::ViewId;

    fn view(path: &str) -> ViewId {
        ViewId::normalize(Some(path), "views/hero.html")
    }

    #[test]
    fn prefers_marked_view_container() {
        let html = "<html><body><div id=\"page\">legacy</div>\
                    <main data-view=\"about\" data-ui=\"light\"><h1>About</h1></main></body></html>";
        let fragment =
            extract_view(html, &view("views/about.html"), &ShellConfig::default()).expect("view");
        assert!(!fragment.synthesized);
        assert_eq!(fragment.name, "about");
        assert_eq!(fragment.inner_html(), "<h1>About</h1>");
    }

    #[test]
    fn wraps_legacy_container_with_derived_name() {
        let html = "<html><body><header>nav</header><div id=\"page\"><p>X</p></div></body></html>";
        let fragment = extract_view(html, &view("views/legacy.html"), &ShellConfig::default())
            .expect("view");
        assert!(fragment.synthesized);
        assert_eq!(fragment.name, "legacy");
        assert_eq!(fragment.inner_html(), "<p>X</p>");
        assert_eq!(
            fragment.document.attribute(fragment.root, "data-view"),
            Some("legacy")
        );
        assert_eq!(
            fragment.document.tag_name(fragment.root),
            Some("main")
        );
    }

    #[test]
    fn falls_back_to_unmarked_main_then_body() {
        let html = "<html><body><main><p>plain</p></main></body></html>";
        let fragment =
            extract_view(html, &view("views/plain.html"), &ShellConfig::default()).expect("view");
        assert_eq!(fragment.inner_html(), "<p>plain</p>");

        let html = "<html><body><p>bare</p></body></html>";
        let fragment =
            extract_view(html, &view("views/bare.html"), &ShellConfig::default()).expect("view");
        assert_eq!(fragment.inner_html(), "<p>bare</p>");
        assert_eq!(fragment.name, "bare");
    }

    #[test]
    fn legacy_container_wins_over_unmarked_main() {
        let html = "<html><body><main><p>main</p></main><div id=\"page\"><p>page</p></div></body></html>";
        let fragment =
            extract_view(html, &view("views/x.html"), &ShellConfig::default()).expect("view");
        assert_eq!(fragment.inner_html(), "<p>page</p>");
    }
}
