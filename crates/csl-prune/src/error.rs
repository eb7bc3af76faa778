//! Error types for the prune pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for csl-prune operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while pruning a style document.
///
/// A reference to an undefined macro is deliberately not represented
/// here: reachability treats it as a dead end and flattening skips the
/// site, so partially edited styles still prune as far as they safely
/// can.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be parsed into a document tree.
    #[error("unable to parse the style file: {0}")]
    Xml(#[from] csl_xml::Error),

    /// The input file could not be read.
    #[error("failed to read '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("failed to write pruned style to '{path}'")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
