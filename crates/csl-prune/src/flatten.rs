//! Layout wrapper flattening.

use crate::registry::MacroRegistry;
use csl_xml::{Document, NodeId};

/// Inline trivial macro wrappers at `layout` call sites.
///
/// A layout qualifies when it has exactly one element child (comments
/// and text are ignored), that child is a `text` element whose only
/// attribute is a non-empty `macro` reference, and the referenced macro
/// is defined. The layout's children are then replaced with a deep copy
/// of the macro's body. Anything else, an extra attribute included,
/// could change rendering semantics and leaves the site untouched, as
/// does a reference the registry cannot resolve.
///
/// The macro definition itself stays in place: it may have other
/// callers, and if the rewritten site was its only one the next pruning
/// pass removes it.
///
/// Returns the number of layouts rewritten. A nonzero count means the
/// registry no longer reflects the tree; recollect it before any
/// registry-dependent operation.
pub fn flatten_layout_macros(doc: &mut Document, registry: &MacroRegistry) -> usize {
    let layouts: Vec<NodeId> = doc.elements_named("layout").collect();
    let mut updated = 0;

    for layout in layouts {
        let element_children: Vec<NodeId> = doc.element_children(layout).collect();
        if element_children.len() != 1 {
            continue;
        }
        let only_child = element_children[0];
        if !doc.is_element_named(only_child, "text") {
            continue;
        }

        // Require a pure macro call; any sibling attribute carries semantics
        let attrs = doc.attributes(only_child);
        if attrs.len() != 1 || attrs[0].name != "macro" || attrs[0].value.is_empty() {
            continue;
        }
        let macro_name = attrs[0].value.clone();
        let Some(def) = registry.get(&macro_name) else {
            continue;
        };

        let body: Vec<NodeId> = doc.children(def).to_vec();
        let copies: Vec<NodeId> = body.into_iter().map(|child| doc.deep_copy(child)).collect();
        doc.clear_children(layout);
        for copy in copies {
            doc.append_child(layout, copy);
        }

        tracing::debug!(name = %macro_name, "Inlined macro body into layout");
        updated += 1;
    }

    updated
}
