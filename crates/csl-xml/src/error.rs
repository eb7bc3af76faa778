//! Error types for XML parsing and serialization.

use thiserror::Error;

/// Result type alias for csl-xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a document tree.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}")]
    XmlSyntax { message: String },

    /// Unexpected end of input.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// Mismatched end tag.
    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// Element nesting exceeded the defensive input limit.
    #[error("element nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Empty document (no root element).
    #[error("empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("invalid XML: multiple root elements")]
    MultipleRoots,
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlSyntax {
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlSyntax {
            message: format!("attribute error: {}", err),
        }
    }
}
