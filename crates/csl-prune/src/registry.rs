//! Macro definition registry.

use csl_xml::{Document, NodeId};
use std::collections::HashMap;

/// Index of macro definitions keyed by their `name` attribute.
///
/// The registry holds node ids into the document it was collected from.
/// It is stale as soon as the tree is structurally mutated: recollect
/// it after flattening and after every pruning pass rather than
/// patching entries in place.
#[derive(Debug, Default)]
pub struct MacroRegistry {
    defs: HashMap<String, NodeId>,
}

impl MacroRegistry {
    /// Scan the document and index every `macro` element carrying a
    /// `name` attribute.
    ///
    /// Nameless macros are left unindexed: they can never be the target
    /// of a reference, though references inside their bodies are still
    /// seen by the liveness walk. If a name is defined twice the later
    /// definition wins, matching a plain map insert.
    pub fn collect(doc: &Document) -> Self {
        let mut defs = HashMap::new();
        for id in doc.elements_named("macro") {
            if let Some(name) = doc.attribute(id, "name") {
                defs.insert(name.to_string(), id);
            }
        }
        MacroRegistry { defs }
    }

    /// Look up the defining node for a macro name.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.defs.get(name).copied()
    }

    /// Whether a definition exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// The registered macro names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(|name| name.as_str())
    }

    /// Iterate over `(name, defining node)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.defs.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
