//! Minimal CSS selector subset.
//!
//! Supports comma lists of compound selectors built from a tag (or `*`),
//! `#id`, `.class`, `[attr]` and `[attr="value"]`. Combinators are rejected.

use super::ElementData;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatcher {
    name: String,
    value: Option<String>,
}

impl Compound {
    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|matcher| {
            match (element.attribute(&matcher.name), &matcher.value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            alternatives.push(parse_compound(part)?);
        }
        Ok(Self { alternatives })
    }

    /// `tag`
    pub fn tag(tag: &str) -> Self {
        Self::single(Compound {
            tag: Some(tag.to_ascii_lowercase()),
            ..Compound::default()
        })
    }

    /// `#id`
    pub fn id(id: &str) -> Self {
        Self::single(Compound {
            id: Some(id.to_string()),
            ..Compound::default()
        })
    }

    /// `.class`
    pub fn class(class: &str) -> Self {
        Self::single(Compound {
            classes: vec![class.to_string()],
            ..Compound::default()
        })
    }

    /// Adds an `[attr]` requirement to every alternative.
    pub fn with_attribute(mut self, name: &str) -> Self {
        for compound in &mut self.alternatives {
            compound.attributes.push(AttributeMatcher {
                name: name.to_string(),
                value: None,
            });
        }
        self
    }

    /// Selector list matching any of `selectors`.
    pub fn any_of(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            alternatives: selectors
                .into_iter()
                .flat_map(|selector| selector.alternatives)
                .collect(),
        }
    }

    fn single(compound: Compound) -> Self {
        Self {
            alternatives: vec![compound],
        }
    }

    pub(crate) fn matches(&self, element: &ElementData) -> bool {
        self.alternatives
            .iter()
            .any(|compound| compound.matches(element))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(source: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let mut chars = source.chars().peekable();

    if chars.peek() == Some(&'*') {
        chars.next();
    } else {
        let tag = take_ident(&mut chars);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let class = take_ident(&mut chars);
                if class.is_empty() {
                    return Err(SelectorError::MissingName('.'));
                }
                compound.classes.push(class);
            }
            '#' => {
                let id = take_ident(&mut chars);
                if id.is_empty() {
                    return Err(SelectorError::MissingName('#'));
                }
                compound.id = Some(id);
            }
            '[' => compound.attributes.push(parse_attribute(&mut chars)?),
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(SelectorError::UnsupportedCombinator(source.to_string()));
            }
            other => return Err(SelectorError::UnexpectedChar(other)),
        }
    }

    Ok(compound)
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = chars.peek().copied() {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn parse_attribute(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<AttributeMatcher, SelectorError> {
    let name = take_ident(chars);
    if name.is_empty() {
        return Err(SelectorError::MissingName('['));
    }
    match chars.next() {
        Some(']') => Ok(AttributeMatcher { name, value: None }),
        Some('=') => {
            let value = match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == quote => break,
                            Some(c) => value.push(c),
                            None => return Err(SelectorError::Unterminated),
                        }
                    }
                    value
                }
                _ => take_ident(chars),
            };
            match chars.next() {
                Some(']') => Ok(AttributeMatcher {
                    name,
                    value: Some(value),
                }),
                Some(other) => Err(SelectorError::UnexpectedChar(other)),
                None => Err(SelectorError::Unterminated),
            }
        }
        Some(other) => Err(SelectorError::UnexpectedChar(other)),
        None => Err(SelectorError::Unterminated),
    }
}

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    Empty,
    MissingName(char),
    UnexpectedChar(char),
    UnsupportedCombinator(String),
    Unterminated,
}

impl Display for SelectorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "selector list contains an empty selector"),
            Self::MissingName(prefix) => write!(f, "expected a name after `{prefix}`"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character `{c}` in selector"),
            Self::UnsupportedCombinator(value) => {
                write!(f, "combinators are not supported: {value}")
            }
            Self::Unterminated => write!(f, "unterminated attribute selector"),
        }
    }
}

impl Error for SelectorError {}
