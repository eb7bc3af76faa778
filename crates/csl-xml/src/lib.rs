//! Mutable XML document trees for CSL style processing.
//!
//! This crate provides the document model and serializer used by
//! [`csl-prune`](../csl_prune/index.html). It wraps [`quick-xml`] to
//! build a tree of nodes addressed by stable [`NodeId`] handles, built
//! for in-place mutation: pruning detaches whole subtrees, flattening
//! splices deep copies into new parents, and the serializer re-emits
//! whatever is left with deterministic formatting.
//!
//! # Overview
//!
//! The main types are:
//! - [`Document`]: the arena-backed tree plus its root element
//! - [`NodeId`]: a copyable handle that stays valid across mutations
//! - [`NodeKind`]: element, text, or comment
//! - [`Attribute`]: an order-preserving element attribute
//!
//! # Example
//!
//! ```rust
//! use csl_xml::parse;
//!
//! let doc = parse(r#"<style class="in-text"><macro name="author"/></style>"#).unwrap();
//! let root = doc.root();
//! assert_eq!(doc.name(root), Some("style"));
//! assert_eq!(doc.attribute(root, "class"), Some("in-text"));
//! ```
//!
//! # Serialization
//!
//! [`save_to_string`] emits a byte-stable rendition: parsing its output
//! and serializing again produces identical text.
//!
//! ```rust
//! use csl_xml::{parse, save_to_string};
//!
//! let doc = parse("<style><info><title>Example</title></info></style>").unwrap();
//! let first = save_to_string(&doc).unwrap();
//! let second = save_to_string(&parse(&first).unwrap()).unwrap();
//! assert_eq!(first, second);
//! ```

pub mod error;
pub mod node;
pub mod parser;
pub mod writer;

// Re-export main types
pub use error::{Error, Result};
pub use node::{Attribute, Document, NodeId, NodeKind};
pub use parser::parse;
pub use writer::{save_to_string, serialize};
