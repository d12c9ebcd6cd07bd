//! View identifier normalization and address encoding.

use crate::host::{location_hash, shell_url};
use std::fmt::{Display, Formatter};

/// Normalized relative view path: no leading `#/` or `/`, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewId(String);

impl ViewId {
    /// Strips one leading `#` (optionally followed by `/`), then one leading
    /// `/`. Absent or empty input resolves to `default_view`.
    pub fn normalize(raw: Option<&str>, default_view: &str) -> Self {
        let Some(raw) = raw.filter(|value| !value.is_empty()) else {
            return Self(default_view.to_string());
        };
        let without_hash = match raw.strip_prefix('#') {
            Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
            None => raw,
        };
        let trimmed = without_hash.strip_prefix('/').unwrap_or(without_hash);
        if trimmed.is_empty() {
            Self(default_view.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// View encoded in the hash of `href`.
    pub fn from_location(href: &str, default_view: &str) -> Self {
        Self::normalize(Some(location_hash(href)), default_view)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fragment file name without directories or `extension`; `view` when
    /// nothing is left.
    pub fn derived_name(&self, extension: &str) -> String {
        let base = self.0.rsplit('/').next().unwrap_or_default();
        let stripped = if base.len() >= extension.len()
            && base.is_char_boundary(base.len() - extension.len())
            && base[base.len() - extension.len()..].eq_ignore_ascii_case(extension)
        {
            &base[..base.len() - extension.len()]
        } else {
            base
        };
        if stripped.is_empty() {
            "view".to_string()
        } else {
            stripped.to_string()
        }
    }

    /// Visible address for this view: the shell URL with `#/<view>`.
    pub fn address(&self, href: &str) -> String {
        format!("{}#/{}", shell_url(href), self.0)
    }
}

impl Display for ViewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ViewId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::ViewId;
    use proptest::prelude::*;

    const DEFAULT: &str = "views/hero.html";

    fn normalize(raw: Option<&str>) -> String {
        ViewId::normalize(raw, DEFAULT).as_str().to_string()
    }

    #[test]
    fn empty_inputs_resolve_to_default_view() {
        assert_eq!(normalize(None), DEFAULT);
        assert_eq!(normalize(Some("")), DEFAULT);
        assert_eq!(normalize(Some("#/")), DEFAULT);
        assert_eq!(normalize(Some("#")), DEFAULT);
        assert_eq!(normalize(Some("/")), DEFAULT);
    }

    #[test]
    fn strips_hash_and_slash_prefixes() {
        assert_eq!(normalize(Some("#/views/about.html")), "views/about.html");
        assert_eq!(normalize(Some("#views/about.html")), "views/about.html");
        assert_eq!(normalize(Some("/views/about.html")), "views/about.html");
        assert_eq!(normalize(Some("views/about.html")), "views/about.html");
    }

    #[test]
    fn from_location_reads_hash_only() {
        let view = ViewId::from_location(
            "https://site.test/index.html#/views/work.html",
            DEFAULT,
        );
        assert_eq!(view.as_str(), "views/work.html");
        let view = ViewId::from_location("https://site.test/views/other.html", DEFAULT);
        assert_eq!(view.as_str(), DEFAULT);
    }

    #[test]
    fn derived_name_strips_directories_and_extension() {
        let view = ViewId::normalize(Some("views/legacy-page.HTML"), DEFAULT);
        assert_eq!(view.derived_name(".html"), "legacy-page");
        let view = ViewId::normalize(Some("views/"), DEFAULT);
        assert_eq!(view.derived_name(".html"), "view");
        let view = ViewId::normalize(Some(".html"), DEFAULT);
        assert_eq!(view.derived_name(".html"), "view");
    }

    #[test]
    fn address_keeps_shell_url_and_replaces_hash() {
        let view = ViewId::normalize(Some("views/about.html"), DEFAULT);
        assert_eq!(
            view.address("https://site.test/index.html#/views/hero.html"),
            "https://site.test/index.html#/views/about.html"
        );
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_for_unprefixed_paths(raw in "[a-z0-9_.-][a-z0-9_./-]{0,30}") {
            let once = ViewId::normalize(Some(raw.as_str()), DEFAULT);
            let twice = ViewId::normalize(Some(once.as_str()), DEFAULT);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalize_never_yields_empty(raw in "[#/]{0,2}[a-z/]{0,10}") {
            prop_assert!(!ViewId::normalize(Some(raw.as_str()), DEFAULT).as_str().is_empty());
        }
    }
}
