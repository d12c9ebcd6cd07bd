//! Anchor click interception rules.
//!
//! An anchor is routed in-app only when it carries the routing attribute and
//! its `href` is a fragment path: not a query/hash/`mailto:`/`tel:` reference,
//! not a cross-origin absolute URL, and ending in the fragment extension.

use crate::config::ShellConfig;
use crate::dom::{Document, NodeId, Selector};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static ABSOLUTE_HTTP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid absolute url regex"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::tag("a"));

/// Decides whether `anchor` is an in-app view link for a shell at `shell_href`.
pub fn is_internal_view_link(
    document: &Document,
    anchor: NodeId,
    config: &ShellConfig,
    shell_href: &str,
) -> bool {
    if !document.has_attribute(anchor, &config.route_attribute) {
        return false;
    }
    let Some(href) = document.attribute(anchor, "href").filter(|href| !href.is_empty()) else {
        return false;
    };
    if href.starts_with('?')
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return false;
    }
    if ABSOLUTE_HTTP_RE.is_match(href) && !same_origin(href, shell_href) {
        return false;
    }
    href.ends_with(&config.fragment_extension)
}

/// `href` of the routed anchor enclosing `target`, if the click must be
/// intercepted.
pub fn intercepted_href(
    document: &Document,
    target: NodeId,
    config: &ShellConfig,
    shell_href: &str,
) -> Option<String> {
    let anchor = document.closest(target, &ANCHOR)?;
    if !is_internal_view_link(document, anchor, config, shell_href) {
        return None;
    }
    document.attribute(anchor, "href").map(str::to_string)
}

fn same_origin(href: &str, shell_href: &str) -> bool {
    match (Url::parse(href), Url::parse(shell_href)) {
        (Ok(link), Ok(shell)) => link.origin() == shell.origin(),
        _ => false,
    }
}
