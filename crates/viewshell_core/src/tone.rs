//! UI tone (header/footer foreground) control.
//!
//! # Responsibility
//! - Map a declared tone token onto the two UI theme variables.
//! - Read tone declarations from view roots and carousel slides.
//!
//! # Invariants
//! - Tokens are matched case-insensitively; anything unrecognized is `Dark`.
//! - Variables are written on the document element only.

use crate::dom::{Document, NodeId};
use log::debug;

pub const UI_FG_VAR: &str = "--ui-fg";
pub const UI_FG_HOVER_VAR: &str = "--ui-fg-hover";

/// Tone attribute spellings, in lookup order.
pub const TONE_ATTRIBUTES: [&str; 2] = ["data-ui", "data-tone"];

/// Foreground tone. `Light` means white UI over dark backgrounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    Light,
    #[default]
    Dark,
}

struct ToneEntry {
    tone: Tone,
    token: &'static str,
    foreground: &'static str,
    hover: &'static str,
}

static TONE_TABLE: [ToneEntry; 2] = [
    ToneEntry {
        tone: Tone::Light,
        token: "light",
        foreground: "#fff",
        hover: "rgba(255,255,255,.65)",
    },
    ToneEntry {
        tone: Tone::Dark,
        token: "dark",
        foreground: "#000",
        hover: "rgba(0,0,0,.55)",
    },
];

impl Tone {
    /// Parses a declared token; absent or unknown tokens give the default.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Self::default();
        };
        TONE_TABLE
            .iter()
            .find(|entry| entry.token.eq_ignore_ascii_case(token.trim()))
            .map(|entry| entry.tone)
            .unwrap_or_default()
    }

    fn entry(self) -> &'static ToneEntry {
        match self {
            Self::Light => &TONE_TABLE[0],
            Self::Dark => &TONE_TABLE[1],
        }
    }

    pub fn as_str(self) -> &'static str {
        self.entry().token
    }

    pub fn foreground(self) -> &'static str {
        self.entry().foreground
    }

    pub fn hover(self) -> &'static str {
        self.entry().hover
    }
}

/// Applies `token` to the document and returns the tone that was set.
pub fn apply_tone(document: &mut Document, token: Option<&str>) -> Tone {
    let tone = Tone::from_token(token);
    if let Some(root) = document.document_element() {
        document.set_style_property(root, UI_FG_VAR, tone.foreground());
        document.set_style_property(root, UI_FG_HOVER_VAR, tone.hover());
    }
    debug!("event=tone_apply module=tone tone={}", tone.as_str());
    tone
}

/// Declared tone of `element` (`data-ui` preferred), ignoring empty values.
pub fn read_tone(document: &Document, element: Option<NodeId>) -> Option<String> {
    let element = element?;
    TONE_ATTRIBUTES
        .iter()
        .filter_map(|name| document.attribute(element, name))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Tone currently written on the document element, if any.
pub fn current_tone(document: &Document) -> Option<Tone> {
    let root = document.document_element()?;
    let foreground = document.style_property(root, UI_FG_VAR)?;
    TONE_TABLE
        .iter()
        .find(|entry| entry.foreground == foreground)
        .map(|entry| entry.tone)
}

#[cfg(test)]
mod tests {
    use super::{apply_tone, current_tone, read_tone, Tone, UI_FG_HOVER_VAR, UI_FG_VAR};
    use crate::dom::{Document, Selector};

    #[test]
    fn tokens_are_case_insensitive_and_default_to_dark() {
        assert_eq!(Tone::from_token(Some("LIGHT")), Tone::Light);
        assert_eq!(Tone::from_token(Some("Dark")), Tone::Dark);
        assert_eq!(Tone::from_token(Some("sepia")), Tone::Dark);
        assert_eq!(Tone::from_token(None), Tone::Dark);
    }

    #[test]
    fn apply_tone_sets_both_variables() {
        let mut doc = Document::parse_html("<html><body></body></html>");
        assert_eq!(current_tone(&doc), None);

        apply_tone(&mut doc, Some("light"));
        let root = doc.document_element().expect("html");
        assert_eq!(doc.style_property(root, UI_FG_VAR).as_deref(), Some("#fff"));
        assert_eq!(
            doc.style_property(root, UI_FG_HOVER_VAR).as_deref(),
            Some("rgba(255,255,255,.65)")
        );
        assert_eq!(current_tone(&doc), Some(Tone::Light));

        apply_tone(&mut doc, None);
        assert_eq!(current_tone(&doc), Some(Tone::Dark));
    }

    #[test]
    fn read_tone_prefers_data_ui_and_skips_empty() {
        let doc = Document::parse_html(
            "<body><main data-ui=\"light\" data-tone=\"dark\"></main>\
             <section data-ui=\"\" data-tone=\"dark\"></section><div></div></body>",
        );
        let body = doc.body().expect("body");
        let main = doc.query_selector(body, &Selector::tag("main"));
        let section = doc.query_selector(body, &Selector::tag("section"));
        let div = doc.query_selector(body, &Selector::tag("div"));
        assert_eq!(read_tone(&doc, main).as_deref(), Some("light"));
        assert_eq!(read_tone(&doc, section).as_deref(), Some("dark"));
        assert_eq!(read_tone(&doc, div), None);
        assert_eq!(read_tone(&doc, None), None);
    }
}
