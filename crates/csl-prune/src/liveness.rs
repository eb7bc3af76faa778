//! Reachability analysis over macro references.

use crate::registry::MacroRegistry;
use csl_xml::{Document, NodeId};
use std::collections::HashSet;

/// Tags whose contents seed the liveness worklist.
const ENTRY_TAGS: [&str; 2] = ["citation", "bibliography"];

/// How the liveness worklist is seeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Seed only from references under the `citation` and
    /// `bibliography` containers. Macro-to-macro references are edges
    /// of the reachability walk, not roots: a reference buried in a
    /// macro nothing renders keeps nothing alive.
    EntryTagsOnly,

    /// Seed from the entry containers and, as a catch-all, from every
    /// reference anywhere in the document, so a reference is live by
    /// merely existing in the tree. This conservative reading keeps
    /// hand-maintained styles working even when references sit outside
    /// the formal entry structure.
    #[default]
    WholeDocument,
}

/// Collect the macro names directly referenced within `node`'s subtree,
/// `node` itself included.
pub(crate) fn gather_refs(doc: &Document, node: NodeId, refs: &mut HashSet<String>) {
    for id in doc.descendants(node) {
        if let Some(name) = doc.attribute(id, "macro") {
            refs.insert(name.to_string());
        }
    }
}

/// Compute the set of macro names transitively reachable from the
/// entry points under the given seeding policy.
///
/// References to undefined macros are dead ends, not errors: the name
/// is marked used (so callers can see it was wanted) but contributes no
/// further edges. The used-set membership check makes the walk
/// terminate on mutually recursive macros without any extra cycle
/// bookkeeping.
pub fn used_macros(
    doc: &Document,
    registry: &MacroRegistry,
    policy: SeedPolicy,
) -> HashSet<String> {
    let mut seeds = HashSet::new();
    for tag in ENTRY_TAGS {
        for entry in doc.elements_named(tag) {
            gather_refs(doc, entry, &mut seeds);
        }
    }
    if policy == SeedPolicy::WholeDocument {
        gather_refs(doc, doc.root(), &mut seeds);
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut worklist: Vec<String> = seeds.into_iter().collect();
    while let Some(name) = worklist.pop() {
        if !used.insert(name.clone()) {
            continue;
        }
        if let Some(def) = registry.get(&name) {
            let mut refs = HashSet::new();
            gather_refs(doc, def, &mut refs);
            for reference in refs {
                if !used.contains(&reference) {
                    worklist.push(reference);
                }
            }
        }
    }
    used
}
