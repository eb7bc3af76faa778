//! XML parser that builds mutable [`Document`] trees.

use crate::error::{Error, Result};
use crate::node::{Attribute, Document, NodeId};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Maximum element nesting accepted from input documents.
const MAX_DEPTH: usize = 128;

/// Parse an XML document into a mutable tree.
///
/// Comments inside the root element are kept as tree nodes. The XML
/// declaration, DOCTYPE, and processing instructions (the `xml-model`
/// declaration emitted by editor tooling, for instance) are not part of
/// the document model and are dropped. Whitespace-only text spanning a
/// line break is indentation and is dropped; any other text is
/// preserved exactly, entities resolved.
///
/// # Example
///
/// ```rust
/// use csl_xml::parse;
///
/// let doc = parse("<style><citation/></style>").unwrap();
/// assert_eq!(doc.name(doc.root()), Some("style"));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not well-formed XML, has no root
/// element, has more than one root element, or nests deeper than the
/// input limit.
pub fn parse(content: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let mut builder = TreeBuilder {
        doc: None,
        stack: Vec::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = builder.open_element(&e)?;
                builder.stack.push(id);
                if builder.stack.len() > MAX_DEPTH {
                    return Err(Error::NestingTooDeep { limit: MAX_DEPTH });
                }
            }
            Ok(Event::Empty(e)) => {
                builder.open_element(&e)?;
            }
            Ok(Event::End(e)) => {
                let raw = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let (_, local) = split_name(&raw);
                builder.close_element(&local)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| Error::XmlSyntax {
                    message: format!("invalid text content: {}", err),
                })?;
                if !is_layout_whitespace(&text) {
                    builder.append_text(text.into_owned());
                }
            }
            Ok(Event::CData(e)) => {
                builder.append_text(String::from_utf8_lossy(e.as_ref()).into_owned());
            }
            Ok(Event::Comment(e)) => {
                builder.append_comment(String::from_utf8_lossy(e.as_ref()).into_owned());
            }
            Ok(Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {
                // Not part of the document model
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlSyntax {
                    message: format!("{} at byte {}", e, reader.error_position()),
                });
            }
        }
    }

    if let Some(&top) = builder.stack.last() {
        let expected = builder
            .doc
            .as_ref()
            .and_then(|doc| doc.name(top))
            .unwrap_or_default()
            .to_string();
        return Err(Error::UnexpectedEof {
            expected: format!("closing tag </{}>", expected),
        });
    }

    builder.doc.ok_or(Error::EmptyDocument)
}

/// Incremental tree construction state.
struct TreeBuilder {
    /// The document, once the root element has been seen.
    doc: Option<Document>,

    /// Open elements, innermost last.
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    /// Create an element for a start or empty-element tag and attach it.
    fn open_element(&mut self, e: &BytesStart<'_>) -> Result<NodeId> {
        let raw = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (prefix, name) = split_name(&raw);
        let attributes = parse_attributes(e)?;

        match (&mut self.doc, self.stack.last().copied()) {
            (Some(doc), Some(parent)) => {
                let id = doc.create_element(prefix, name, attributes);
                doc.append_child(parent, id);
                Ok(id)
            }
            (Some(_), None) => Err(Error::MultipleRoots),
            (None, _) => {
                let doc = Document::with_root(prefix, name, attributes);
                let root = doc.root();
                self.doc = Some(doc);
                Ok(root)
            }
        }
    }

    /// Pop the innermost open element, verifying the tag names match.
    fn close_element(&mut self, end_local: &str) -> Result<()> {
        match (self.doc.as_ref(), self.stack.pop()) {
            (Some(doc), Some(top)) => {
                let expected = doc.name(top).unwrap_or_default();
                if expected != end_local {
                    return Err(Error::MismatchedEndTag {
                        expected: expected.to_string(),
                        found: end_local.to_string(),
                    });
                }
                Ok(())
            }
            _ => Err(Error::XmlSyntax {
                message: format!("unexpected closing tag </{}>", end_local),
            }),
        }
    }

    /// Append a text node to the innermost open element, if any.
    fn append_text(&mut self, content: String) {
        if let (Some(doc), Some(&parent)) = (self.doc.as_mut(), self.stack.last()) {
            let id = doc.create_text(content);
            doc.append_child(parent, id);
        }
    }

    /// Append a comment node to the innermost open element, if any.
    ///
    /// Comments outside the root element are dropped.
    fn append_comment(&mut self, body: String) {
        if let (Some(doc), Some(&parent)) = (self.doc.as_mut(), self.stack.last()) {
            let id = doc.create_comment(body);
            doc.append_child(parent, id);
        }
    }
}

/// Split a raw tag or attribute name into namespace prefix and local name.
fn split_name(raw: &str) -> (Option<String>, String) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, raw.to_string()),
    }
}

fn parse_attributes(e: &BytesStart<'_>) -> Result<Vec<Attribute>> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let raw = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let (prefix, name) = split_name(&raw);
        let value = attr
            .unescape_value()
            .map_err(|err| Error::XmlSyntax {
                message: format!("invalid attribute value: {}", err),
            })?
            .into_owned();
        attributes.push(Attribute {
            prefix,
            name,
            value,
        });
    }
    Ok(attributes)
}

/// Indentation between elements: whitespace-only text spanning a line
/// break. A whitespace-only run without a newline (a single-space term
/// value, say) is real content and is kept.
fn is_layout_whitespace(text: &str) -> bool {
    text.contains('\n') && text.trim().is_empty()
}
