//! Macro reference tallying.
//!
//! A pure query over the document used for reports: how often each
//! macro is called, and which definitions are never called at all.

use csl_xml::Document;
use std::collections::{HashMap, HashSet};

/// Reference counts for a style's macros.
#[derive(Debug, Clone, Default)]
pub struct MacroTally {
    /// `(name, count)` for every referenced name, defined or not,
    /// sorted by descending count, then name.
    pub counts: Vec<(String, usize)>,

    /// Defined macros with zero references, sorted by name.
    pub unused: Vec<String>,

    /// Total number of named macro definitions.
    pub total_defined: usize,
}

impl MacroTally {
    /// Number of defined macros that are referenced at least once.
    pub fn used_defined(&self) -> usize {
        self.total_defined - self.unused.len()
    }
}

/// Count macro references across the whole document.
pub fn tally(doc: &Document) -> MacroTally {
    let mut defined: HashSet<String> = HashSet::new();
    for id in doc.elements_named("macro") {
        if let Some(name) = doc.attribute(id, "name") {
            defined.insert(name.to_string());
        }
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for id in doc.descendants(doc.root()) {
        if let Some(name) = doc.attribute(id, "macro") {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    let mut unused: Vec<String> = defined
        .iter()
        .filter(|name| !counts.contains_key(*name))
        .cloned()
        .collect();
    unused.sort();

    let mut referenced: Vec<(String, usize)> = counts.into_iter().collect();
    referenced.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    MacroTally {
        counts: referenced,
        unused,
        total_defined: defined.len(),
    }
}
