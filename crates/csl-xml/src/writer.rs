//! Deterministic serialization of document trees.
//!
//! Indentation is derived only from tree depth, so structural edits can
//! never leave stale formatting behind. [`save_to_string`] additionally
//! re-parses its own emission and serializes once more, making the
//! returned text a fixed point: serializing it again is byte-identical.

use crate::error::Result;
use crate::node::{Attribute, Document, NodeId, NodeKind};
use crate::parser;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";
const INDENT: &str = "  ";

/// The attribute forced to the end of `style` start tags.
const TRAILING_STYLE_ATTRIBUTE: &str = "default-locale";

const EM_DASH: char = '\u{2014}';
const EM_DASH_REF: &str = "&#8212;";

/// Serialize the tree once, without the stabilizing re-parse.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    emit_block(doc, doc.root(), 0, &mut out);
    out
}

/// Serialize, re-parse the emission, and serialize once more.
///
/// The extra round guarantees the output is byte-stable under further
/// parse/serialize round-trips, whatever mutations the tree has been
/// through.
///
/// # Errors
///
/// Fails only if the intermediate emission cannot be re-parsed, which
/// indicates a malformed tree (e.g. a comment body containing `--`).
pub fn save_to_string(doc: &Document) -> Result<String> {
    let first = serialize(doc);
    let reparsed = parser::parse(&first)?;
    Ok(serialize(&reparsed))
}

fn emit_block(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    match doc.kind(id) {
        NodeKind::Element { .. } => {
            let children = doc.children(id);
            let has_text = children
                .iter()
                .any(|&c| matches!(doc.kind(c), NodeKind::Text(_)));
            emit_start_tag(doc, id, out);
            if children.is_empty() {
                out.push_str("/>");
            } else if has_text {
                // Text-bearing content stays on one line
                out.push('>');
                for &child in children {
                    emit_inline(doc, child, out);
                }
                emit_end_tag(doc, id, out);
            } else {
                out.push('>');
                out.push('\n');
                for &child in children {
                    emit_block(doc, child, depth + 1, out);
                }
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                emit_end_tag(doc, id, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(body) => emit_comment(body, out),
    }
    out.push('\n');
}

fn emit_inline(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Element { .. } => {
            emit_start_tag(doc, id, out);
            let children = doc.children(id);
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for &child in children {
                    emit_inline(doc, child, out);
                }
                emit_end_tag(doc, id, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(body) => emit_comment(body, out),
    }
}

fn emit_start_tag(doc: &Document, id: NodeId, out: &mut String) {
    if let NodeKind::Element { prefix, name } = doc.kind(id) {
        out.push('<');
        if let Some(prefix) = prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(name);
        for attr in ordered_attributes(doc, id) {
            out.push(' ');
            out.push_str(&attr.qualified_name());
            out.push_str("=\"");
            out.push_str(&escape_attribute(&attr.value));
            out.push('"');
        }
    }
}

fn emit_end_tag(doc: &Document, id: NodeId, out: &mut String) {
    if let NodeKind::Element { prefix, name } = doc.kind(id) {
        out.push_str("</");
        if let Some(prefix) = prefix {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(name);
        out.push('>');
    }
}

fn emit_comment(body: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(&collapse_comment_body(body));
    out.push_str("-->");
}

/// Attributes in document order, except that on `style` elements the
/// `default-locale` attribute always sorts to the end.
fn ordered_attributes<'a>(doc: &'a Document, id: NodeId) -> Vec<&'a Attribute> {
    let attrs = doc.attributes(id);
    if !doc.is_element_named(id, "style") {
        return attrs.iter().collect();
    }
    let (trailing, leading): (Vec<&Attribute>, Vec<&Attribute>) = attrs
        .iter()
        .partition(|a| a.name == TRAILING_STYLE_ATTRIBUTE && a.prefix.is_none());
    leading.into_iter().chain(trailing).collect()
}

/// Escape text content. Em dashes become decimal character references;
/// downstream consumers reject the serializer-default escaping of them.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            EM_DASH => out.push_str(EM_DASH_REF),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            EM_DASH => out.push_str(EM_DASH_REF),
            _ => out.push(ch),
        }
    }
    out
}

/// Collapse runs of tag-only lines inside a comment body to single
/// lines, keeping the indentation of the first line of each run. XML
/// fragments quoted in comments follow the same one-line-per-tag
/// convention as live code in the upstream style repository.
fn collapse_comment_body(body: &str) -> String {
    if !body.contains('\n') {
        return body.to_string();
    }
    let lines: Vec<&str> = body.split('\n').collect();
    let mut collapsed_lines: Vec<String> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if is_tag_only_line(lines[i]) {
            let start = i;
            while i < lines.len() && is_tag_only_line(lines[i]) {
                i += 1;
            }
            let indent: String = lines[start]
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            let mut collapsed = indent;
            for line in &lines[start..i] {
                collapsed.push_str(line.trim());
            }
            collapsed_lines.push(collapsed);
        } else {
            collapsed_lines.push(lines[i].to_string());
            i += 1;
        }
    }
    collapsed_lines.join("\n")
}

/// Whether the line consists of a single tag and surrounding blanks.
fn is_tag_only_line(line: &str) -> bool {
    let trimmed = line.trim_matches(|c| c == ' ' || c == '\t');
    let Some(inner) = trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
    else {
        return false;
    };
    !inner.is_empty() && !inner.contains('>')
}
