//! The prune pipeline: parse, flatten, prune, save.

use crate::error::{Error, Result};
use crate::flatten;
use crate::liveness::{self, SeedPolicy};
use crate::registry::MacroRegistry;
use csl_xml::{Document, NodeId};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Removes macro definitions that can never be rendered.
///
/// The lifecycle is a strict sequence: the tree is created once by
/// parsing, mutated in place through flattening and pruning, and
/// serialized once at the end. A `StylePruner` owns its document
/// exclusively; callers wanting parallelism run one pruner per
/// document, never one document across threads.
///
/// # Example
///
/// ```rust
/// use csl_prune::StylePruner;
///
/// let csl = r#"<style xmlns="http://purl.org/net/xbiblio/csl">
///   <macro name="author"><names variable="author"/></macro>
///   <macro name="orphan"><text variable="title"/></macro>
///   <citation><layout><text macro="author"/></layout></citation>
/// </style>"#;
///
/// let mut pruner = StylePruner::from_str(csl).unwrap();
/// assert_eq!(pruner.prune(), 1);
/// assert!(pruner.registry().contains("author"));
/// assert!(!pruner.registry().contains("orphan"));
/// ```
#[derive(Debug)]
pub struct StylePruner {
    doc: Document,
    registry: MacroRegistry,
    modified: bool,
    notice: Option<String>,
}

impl StylePruner {
    /// Parse a style document and index its macros.
    pub fn from_str(content: &str) -> Result<Self> {
        let doc = csl_xml::parse(content)?;
        let registry = MacroRegistry::collect(&doc);
        Ok(StylePruner {
            doc,
            registry,
            modified: false,
            notice: None,
        })
    }

    /// Read and parse a style file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// The current document tree.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The current macro registry.
    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    /// Whether flattening or pruning has changed the tree.
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Attach a notice inserted as the first comment of the root
    /// element when the document is saved.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    /// Inline trivial layout wrappers (see
    /// [`flatten_layout_macros`](crate::flatten::flatten_layout_macros)),
    /// recollecting the registry if anything changed.
    pub fn flatten(&mut self) -> usize {
        let updated = flatten::flatten_layout_macros(&mut self.doc, &self.registry);
        if updated > 0 {
            self.modified = true;
            self.registry = MacroRegistry::collect(&self.doc);
        }
        updated
    }

    /// The macro names reachable from the entry points right now.
    pub fn used_macros(&self, policy: SeedPolicy) -> HashSet<String> {
        liveness::used_macros(&self.doc, &self.registry, policy)
    }

    /// Prune with the default permissive seeding policy.
    pub fn prune(&mut self) -> usize {
        self.prune_with_policy(SeedPolicy::default())
    }

    /// Repeatedly remove unreachable macro definitions until a pass
    /// removes nothing.
    ///
    /// A single pass is not enough: a macro referenced only from a
    /// definition that pass N removes still looked used when pass N
    /// started, and only a recomputation over the rebuilt registry sees
    /// it die. At the fixed point the surviving definitions are exactly
    /// the reachable set. Returns the total number removed.
    pub fn prune_with_policy(&mut self, policy: SeedPolicy) -> usize {
        let mut total_removed = 0;
        loop {
            let used = liveness::used_macros(&self.doc, &self.registry, policy);
            let removed: Vec<(String, NodeId)> = self
                .registry
                .iter()
                .filter(|(name, def)| !used.contains(*name) && self.doc.parent(*def).is_some())
                .map(|(name, def)| (name.to_string(), def))
                .collect();

            if removed.is_empty() {
                tracing::debug!("No unused macros found on this pass");
                break;
            }
            for (name, def) in &removed {
                self.doc.detach(*def);
                tracing::debug!(name = %name, "Removed macro");
            }
            total_removed += removed.len();
            self.modified = true;
            self.registry = MacroRegistry::collect(&self.doc);
        }

        if total_removed > 0 {
            tracing::info!(count = total_removed, "Removed unused macros");
        } else {
            tracing::info!("No macros pruned");
        }
        total_removed
    }

    /// Serialize the document, inserting the notice comment if one was
    /// set.
    pub fn save_to_string(&mut self) -> Result<String> {
        if let Some(notice) = self.notice.take() {
            let root = self.doc.root();
            let comment = self.doc.create_comment(format!(" {} ", notice.trim()));
            self.doc.insert_child(root, 0, comment);
        }
        Ok(csl_xml::save_to_string(&self.doc)?)
    }

    /// Serialize the document and write it to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let output = self.save_to_string()?;
        fs::write(path, output).map_err(|source| Error::Save {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Wrote pruned style");
        Ok(())
    }
}
