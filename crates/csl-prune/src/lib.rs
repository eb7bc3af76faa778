//! Macro liveness analysis and pruning for CSL styles.
//!
//! Citation-style variants are produced by patching a base template,
//! which routinely strands macro definitions nothing references
//! anymore. This crate removes them: it computes, via reachability from
//! the `citation` and `bibliography` entry points, which macros are
//! actually invoked, deletes the rest until a fixed point, and can
//! first flatten trivial wrapper indirection so single-use wrappers
//! become prunable too. It builds on [`csl_xml`] for the mutable
//! document tree and deterministic serialization.
//!
//! # Overview
//!
//! The main types are:
//! - [`StylePruner`]: the parse → flatten → prune → save pipeline
//! - [`MacroRegistry`]: the name → definition index, recollected after
//!   every structural mutation
//! - [`SeedPolicy`]: how liveness roots are chosen
//! - [`MacroTally`]: reference-count reporting
//!
//! # Example
//!
//! ```rust
//! use csl_prune::StylePruner;
//!
//! let csl = r#"<style xmlns="http://purl.org/net/xbiblio/csl">
//!   <macro name="used"><text value="u"/></macro>
//!   <macro name="unused"><text value="x"/></macro>
//!   <citation><layout><text macro="used"/></layout></citation>
//! </style>"#;
//!
//! let mut pruner = StylePruner::from_str(csl).unwrap();
//! assert_eq!(pruner.prune(), 1);
//! assert!(pruner.registry().contains("used"));
//! assert!(!pruner.registry().contains("unused"));
//!
//! let output = pruner.save_to_string().unwrap();
//! assert!(!output.contains("unused"));
//! ```
//!
//! # Concurrency and logging
//!
//! One pruner owns one document. Callers processing a batch run
//! independent pruners, one per input, with no shared state; a tree is
//! never touched from two threads.
//!
//! Progress is reported as [`tracing`] events. The crate installs no
//! subscriber of its own; embed it under whatever subscriber the run
//! provides (e.g. `tracing::subscriber::with_default` per document
//! batch).

pub mod error;
pub mod flatten;
pub mod liveness;
pub mod pruner;
pub mod registry;
pub mod tally;

// Re-export main types
pub use error::{Error, Result};
pub use flatten::flatten_layout_macros;
pub use liveness::{SeedPolicy, used_macros};
pub use pruner::StylePruner;
pub use registry::MacroRegistry;
pub use tally::{MacroTally, tally};
