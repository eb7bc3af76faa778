//! Integration tests for the full flatten → prune → save pipeline.
//!
//! Inputs are inline CSL fragments; the assertions pin down the
//! tree-level guarantees the pipeline makes rather than byte-for-byte
//! preservation of input formatting.

use csl_prune::{SeedPolicy, StylePruner, tally};
use csl_xml::parse;
use std::collections::HashSet;

const EXAMPLE: &str = r#"<?xml version="1.0"?>
<style xmlns="http://purl.org/net/xbiblio/csl">
  <macro name="used-macro"><text value="used"/></macro>
  <macro name="unused-macro"><text value="unused"/></macro>
  <citation>
    <layout>
      <text macro="used-macro"/>
    </layout>
  </citation>
</style>
"#;

const EXAMPLE_WITH_XML_MODEL: &str = r#"<?xml version="1.0"?>
<?xml-model href="http://example.com/schema.rng" type="application/xml"?>
<style xmlns="http://purl.org/net/xbiblio/csl">
  <macro name="test-macro"><text value="test"/></macro>
  <citation>
    <layout>
      <text macro="test-macro"/>
    </layout>
  </citation>
</style>
"#;

#[test]
fn test_prune_removes_unused_macros() {
    let mut pruner = StylePruner::from_str(EXAMPLE).unwrap();
    pruner.prune();

    let names: Vec<&str> = pruner.registry().names().collect();
    assert_eq!(names, vec!["used-macro"]);

    let out = pruner.save_to_string().unwrap();
    assert!(out.contains("used-macro"));
    assert!(!out.contains("unused-macro"));
}

#[test]
fn test_closure_correctness_at_fixed_point() {
    let csl = r#"<style>
  <macro name="a"><text macro="b"/></macro>
  <macro name="b"><text variable="title"/></macro>
  <macro name="c"><text macro="d"/></macro>
  <macro name="d"><text variable="issued"/></macro>
  <citation><layout><text macro="a"/></layout></citation>
  <bibliography><layout><text macro="undefined-ref"/></layout></bibliography>
</style>"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();
    pruner.prune();

    // Every surviving definition is reachable, and every reachable
    // name either survives or was never defined
    let used = pruner.used_macros(SeedPolicy::default());
    let surviving: HashSet<String> = pruner.registry().names().map(String::from).collect();
    assert!(surviving.iter().all(|name| used.contains(name)));
    for name in &used {
        assert!(
            surviving.contains(name) || name == "undefined-ref",
            "reachable name '{}' lost its definition",
            name
        );
    }
    assert_eq!(surviving.len(), 2);
}

#[test]
fn test_prune_is_idempotent() {
    let mut pruner = StylePruner::from_str(EXAMPLE).unwrap();
    let first = pruner.prune();
    assert_eq!(first, 1);
    assert_eq!(pruner.prune(), 0);
    assert_eq!(pruner.prune_with_policy(SeedPolicy::WholeDocument), 0);
}

#[test]
fn test_mutually_recursive_dead_macros_removed() {
    let csl = r#"<style>
  <macro name="ping"><text macro="pong"/></macro>
  <macro name="pong"><text macro="ping"/></macro>
  <macro name="kept"><text value="k"/></macro>
  <citation><layout><text macro="kept"/></layout></citation>
</style>"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();
    let removed = pruner.prune_with_policy(SeedPolicy::EntryTagsOnly);
    assert_eq!(removed, 2);
    let names: Vec<&str> = pruner.registry().names().collect();
    assert_eq!(names, vec!["kept"]);

    // The cycle keeps itself alive under the permissive policy: each
    // reference exists in the tree, so each seeds the worklist
    let mut permissive = StylePruner::from_str(csl).unwrap();
    assert_eq!(permissive.prune_with_policy(SeedPolicy::WholeDocument), 0);
    assert!(permissive.registry().contains("ping"));
    assert!(permissive.registry().contains("pong"));
}

#[test]
fn test_flatten_exposes_wrapper_for_pruning() {
    let csl = r#"<style>
  <macro name="layout-wrapper">
    <group delimiter=", ">
      <text variable="title"/>
    </group>
  </macro>
  <citation>
    <layout>
      <text macro="layout-wrapper"/>
    </layout>
  </citation>
</style>"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();
    assert_eq!(pruner.flatten(), 1);

    // The layout's children are now a copy of the macro body
    let doc = pruner.document();
    let layouts: Vec<_> = doc.elements_named("layout").collect();
    let children: Vec<_> = doc.element_children(layouts[0]).collect();
    assert_eq!(children.len(), 1);
    assert!(doc.is_element_named(children[0], "group"));
    assert_eq!(doc.attribute(children[0], "delimiter"), Some(", "));

    // The wrapper had no other referrers, so pruning removes it
    assert_eq!(pruner.prune(), 1);
    assert!(pruner.registry().is_empty());

    let out = pruner.save_to_string().unwrap();
    assert!(!out.contains("<macro"));
    assert!(out.contains("<group delimiter=\", \">"));
}

#[test]
fn test_flatten_survivors_stay_live() {
    let csl = r#"<style>
  <macro name="shared"><text variable="title"/></macro>
  <citation><layout><text macro="shared"/></layout></citation>
  <bibliography>
    <layout>
      <text macro="shared"/>
      <text macro="missing"/>
    </layout>
  </bibliography>
</style>"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();

    // Citation layout flattens; bibliography layout has two children
    // and is left alone, still referencing "shared"
    assert_eq!(pruner.flatten(), 1);

    // Every name still referenced resolves, or dead-ends silently
    let used = pruner.used_macros(SeedPolicy::default());
    assert!(used.contains("shared"));
    assert!(used.contains("missing"));
    assert!(pruner.registry().contains("shared"));
    assert!(!pruner.registry().contains("missing"));

    // "shared" still has a live caller, so it survives pruning
    assert_eq!(pruner.prune(), 0);
    assert!(pruner.registry().contains("shared"));
}

#[test]
fn test_never_referenced_macro_removed_without_flattening() {
    let mut pruner = StylePruner::from_str(EXAMPLE).unwrap();
    assert_eq!(pruner.flatten(), 0);
    assert_eq!(pruner.prune(), 1);
}

#[test]
fn test_entry_tags_only_policy_is_stricter() {
    // "stray" is referenced from the info block, outside both entry
    // containers
    let csl = r#"<style>
  <info><category macro="stray"/></info>
  <macro name="stray"><text variable="title"/></macro>
  <citation><layout><text value="x"/></layout></citation>
</style>"#;

    let mut permissive = StylePruner::from_str(csl).unwrap();
    assert_eq!(permissive.prune_with_policy(SeedPolicy::WholeDocument), 0);
    assert!(permissive.registry().contains("stray"));

    let mut strict = StylePruner::from_str(csl).unwrap();
    assert_eq!(strict.prune_with_policy(SeedPolicy::EntryTagsOnly), 1);
    assert!(!strict.registry().contains("stray"));
}

#[test]
fn test_xml_model_pi_excluded_from_output() {
    let mut pruner = StylePruner::from_str(EXAMPLE_WITH_XML_MODEL).unwrap();
    pruner.prune();
    let out = pruner.save_to_string().unwrap();

    assert!(!out.contains("<?xml-model"));
    assert!(out.contains("<macro"));
    assert!(out.contains("<citation>"));
}

#[test]
fn test_save_is_idempotent_after_pipeline() {
    let csl = r#"<?xml version="1.0" encoding="utf-8"?>
<style xmlns="http://purl.org/net/xbiblio/csl" default-locale="en-US" class="in-text" version="1.0">
  <info>
    <title>Example Variant</title>
  </info>
  <!-- subsequent-author-substitute:
       <text value="&#8212;&#8212;&#8212;"/>
  -->
  <macro name="author"><names variable="author"/></macro>
  <macro name="stale"><text variable="note"/></macro>
  <citation>
    <layout>
      <text macro="author"/>
    </layout>
  </citation>
</style>
"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();
    pruner.flatten();
    pruner.prune();
    let first = pruner.save_to_string().unwrap();

    let reparsed = parse(&first).unwrap();
    let second = csl_xml::save_to_string(&reparsed).unwrap();
    assert_eq!(first, second);

    // Em dashes stay as decimal references in the output
    assert!(first.contains("&#8212;&#8212;&#8212;"));
    assert!(!first.contains('\u{2014}'));
}

#[test]
fn test_default_locale_reordered_exactly_once() {
    let variants = [
        r#"<style default-locale="en-US" class="in-text" version="1.0"><citation><layout/></citation></style>"#,
        r#"<style class="in-text" default-locale="en-US" version="1.0"><citation><layout/></citation></style>"#,
        r#"<style class="in-text" version="1.0" default-locale="en-US"><citation><layout/></citation></style>"#,
        r#"<style default-locale="en-US"><citation><layout/></citation></style>"#,
    ];
    for csl in variants {
        let mut pruner = StylePruner::from_str(csl).unwrap();
        let out = pruner.save_to_string().unwrap();
        assert_eq!(out.matches("default-locale=\"en-US\"").count(), 1);
        let style_line = out.lines().nth(1).unwrap();
        assert!(
            style_line.ends_with("default-locale=\"en-US\">"),
            "default-locale not trailing in: {}",
            style_line
        );
    }
}

#[test]
fn test_notice_comment_leads_output() {
    let mut pruner = StylePruner::from_str(EXAMPLE).unwrap();
    pruner.prune();
    pruner.set_notice("Variant of the base style; regenerate instead of editing.");
    let out = pruner.save_to_string().unwrap();

    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert_eq!(
        lines.next(),
        Some("<style xmlns=\"http://purl.org/net/xbiblio/csl\">")
    );
    assert_eq!(
        lines.next(),
        Some("  <!-- Variant of the base style; regenerate instead of editing. -->")
    );
}

#[test]
fn test_tally_matches_prune_outcome() {
    let doc = parse(EXAMPLE).unwrap();
    let tally = tally(&doc);
    assert_eq!(tally.total_defined, 2);
    assert_eq!(tally.unused, vec!["unused-macro".to_string()]);
    assert_eq!(tally.counts, vec![("used-macro".to_string(), 1)]);

    // Pruning removes exactly the macros the tally reports as unused
    let mut pruner = StylePruner::from_str(EXAMPLE).unwrap();
    assert_eq!(pruner.prune(), tally.unused.len());
}

#[test]
fn test_comments_survive_the_pipeline() {
    let csl = r#"<style>
  <!-- kept: documents the citation block -->
  <macro name="a"><text value="x"/></macro>
  <citation><layout><text macro="a"/></layout></citation>
</style>"#;
    let mut pruner = StylePruner::from_str(csl).unwrap();
    pruner.flatten();
    pruner.prune();
    let out = pruner.save_to_string().unwrap();
    assert!(out.contains("<!-- kept: documents the citation block -->"));
}
