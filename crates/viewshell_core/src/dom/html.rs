//! HTML parsing (html5ever) and serialization for the arena document.

use super::{Document, NodeId, NodeKind};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document as parse_with_html5ever, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(super) fn parse_document(source: &str) -> Document {
    let dom = parse_with_html5ever(RcDom::default(), ParseOpts::default()).one(source);
    let mut document = Document::new();
    let root = document.root();

    // Explicit stack: fragment files can nest deeply enough to matter.
    let mut stack: Vec<(NodeId, Handle)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (root, child.clone()))
        .collect();

    while let Some((parent, handle)) = stack.pop() {
        let created = match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let id = document.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    document.set_attribute(id, &attr.name.local, &attr.value);
                }
                Some(id)
            }
            NodeData::Text { contents } => Some(document.create_text(contents.borrow().to_string())),
            NodeData::Comment { contents } => Some(document.create_comment(contents.to_string())),
            NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
                None
            }
        };
        let Some(id) = created else {
            continue;
        };
        document.append_child(parent, id);
        stack.extend(
            handle
                .children
                .borrow()
                .iter()
                .rev()
                .map(|child| (id, child.clone())),
        );
    }

    document
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Serializes `id` with an explicit stack so nesting depth never reaches the
/// call stack.
pub(super) fn write_node(document: &Document, id: NodeId, out: &mut String) {
    let mut stack = vec![Step::Open(id)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Open(id) => id,
            Step::Close(id) => {
                if let Some(tag) = document.tag_name(id) {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                continue;
            }
        };
        match document.kind(id) {
            None => {}
            Some(NodeKind::Document) => {
                stack.extend(document.children(id).iter().rev().map(|child| Step::Open(*child)));
            }
            Some(NodeKind::Text(text)) => {
                let raw = document
                    .parent(id)
                    .and_then(|parent| document.tag_name(parent))
                    .map(|tag| RAW_TEXT_ELEMENTS.contains(&tag))
                    .unwrap_or(false);
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(text, false, out);
                }
            }
            Some(NodeKind::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeKind::Element(data)) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                    continue;
                }
                stack.push(Step::Close(id));
                stack.extend(document.children(id).iter().rev().map(|child| Step::Open(*child)));
            }
        }
    }
}

fn escape_into(value: &str, attribute: bool, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}
