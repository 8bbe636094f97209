//! Cross-format properties of the export engine.
//!
//! Random trees exercise determinism, id allocation, JSON validity and the GraphML
//! key schema; the fixed cases pin the documented per-format layouts.

use ast_lens::domain::text::summarize;
use ast_lens::domain::{AstNode, ExportFormat};
use ast_lens::export;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn type_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,8}"
}

fn attribute_strategy() -> impl Strategy<Value = (String, String)> {
    // printable ASCII plus line breaks, including quotes and backslashes
    ("[a-z][a-z_]{0,6}", "[ -~\n\r]{0,12}")
}

fn build(
    type_name: String,
    attributes: Vec<(String, String)>,
    singles: Vec<Option<AstNode>>,
    lists: Vec<Vec<AstNode>>,
) -> AstNode {
    let mut builder = AstNode::builder(type_name);
    for (name, value) in attributes {
        builder = builder.attr(name, value);
    }
    for (i, child) in singles.into_iter().enumerate() {
        builder = builder.child(format!("child{}", i), child);
    }
    for (i, items) in lists.into_iter().enumerate() {
        builder = builder.list(format!("item{}s", i), items);
    }
    builder.build()
}

fn tree_strategy() -> impl Strategy<Value = AstNode> {
    let leaf = (
        type_name_strategy(),
        prop::collection::vec(attribute_strategy(), 0..3),
    )
        .prop_map(|(ty, attrs)| build(ty, attrs, vec![], vec![]));

    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            type_name_strategy(),
            prop::collection::vec(attribute_strategy(), 0..3),
            prop::collection::vec(prop::option::of(inner.clone()), 0..3),
            prop::collection::vec(prop::collection::vec(inner, 0..3), 0..2),
        )
            .prop_map(|(ty, attrs, singles, lists)| build(ty, attrs, singles, lists))
    })
}

/// Values of `attr="..."` in document order.
fn attribute_values(doc: &str, attr: &str) -> Vec<String> {
    let needle = format!(" {}=\"", attr);
    doc.match_indices(&needle)
        .filter_map(|(at, _)| {
            let rest = &doc[at + needle.len()..];
            rest.find('"').map(|end| rest[..end].to_string())
        })
        .collect()
}

fn declared_keys(doc: &str, elem: &str) -> Vec<String> {
    doc.lines()
        .filter(|l| l.trim_start().starts_with("<key ") && l.contains(&format!("for=\"{}\"", elem)))
        .flat_map(|l| attribute_values(l, "id"))
        .collect()
}

proptest! {
    #[test]
    fn export_is_deterministic(tree in tree_strategy()) {
        for format in ExportFormat::ALL {
            prop_assert_eq!(export(&tree, format, true), export(&tree, format, true));
        }
    }

    #[test]
    fn ids_follow_visit_order(tree in tree_strategy()) {
        let doc = export(&tree, ExportFormat::GraphMarkup, true);
        let count = tree.node_count();

        let node_ids: Vec<String> = doc
            .lines()
            .filter(|l| l.trim_start().starts_with("<node "))
            .flat_map(|l| attribute_values(l, "id"))
            .collect();
        let expected: Vec<String> = (0..count).map(|i| format!("n{}", i)).collect();
        prop_assert_eq!(node_ids, expected);

        let edge_ids: Vec<String> = doc
            .lines()
            .filter(|l| l.trim_start().starts_with("<edge "))
            .flat_map(|l| attribute_values(l, "id"))
            .collect();
        let expected: Vec<String> = (0..count - 1).map(|i| format!("e{}", i)).collect();
        prop_assert_eq!(edge_ids, expected);

        // Cypher allocates the same node ids in the same order
        let script = export(&tree, ExportFormat::GraphQueryScript, true);
        let merged: Vec<String> = script
            .lines()
            .filter(|l| l.starts_with("MERGE(") && l.contains(":Node:"))
            .filter_map(|l| l["MERGE(".len()..].split(':').next().map(str::to_string))
            .collect();
        let expected: Vec<String> = (0..count).map(|i| format!("n{}", i)).collect();
        prop_assert_eq!(merged, expected);

        let children: Vec<String> = script
            .lines()
            .filter(|l| l.starts_with("MERGE (") && l.contains(")<-[:PARENT]-("))
            .filter_map(|l| l.rsplit('(').next().map(|c| c.trim_end_matches(')').to_string()))
            .collect();
        let expected: Vec<String> = (1..count).map(|i| format!("n{}", i)).collect();
        prop_assert_eq!(children, expected);
    }

    #[test]
    fn json_is_always_valid(tree in tree_strategy()) {
        for include_type_name in [true, false] {
            let json = export(&tree, ExportFormat::ObjectNotation, include_type_name);
            let value: Result<serde_json::Value, _> = serde_json::from_str(&json);
            prop_assert!(value.is_ok(), "invalid JSON: {}", json);
        }
        let value: serde_json::Value =
            serde_json::from_str(&export(&tree, ExportFormat::ObjectNotation, true)).unwrap();
        prop_assert_eq!(value["_type"].as_str(), Some(tree.type_name.as_str()));
    }

    #[test]
    fn graphml_keys_match_used_names(tree in tree_strategy(), include_type_name in any::<bool>()) {
        let doc = export(&tree, ExportFormat::GraphMarkup, include_type_name);

        let mut used: BTreeSet<String> = ["id", "labels"].iter().map(|s| s.to_string()).collect();
        let graph = &doc[doc.find("<graph ").unwrap()..];
        let node_section = &graph[..graph.find("<edge ").unwrap_or(graph.len())];
        used.extend(attribute_values(node_section, "key"));

        let declared = declared_keys(&doc, "node");
        let declared_set: BTreeSet<String> = declared.iter().cloned().collect();
        prop_assert_eq!(declared.len(), declared_set.len());
        prop_assert_eq!(declared, used.into_iter().collect::<Vec<_>>());

        let edge_keys = declared_keys(&doc, "edge");
        if tree.node_count() > 1 {
            prop_assert_eq!(edge_keys, vec!["id", "label", "source", "target"]);
        } else {
            prop_assert!(edge_keys.is_empty());
        }
    }

    #[test]
    fn ascii_has_one_line_per_node(tree in tree_strategy()) {
        let text = export(&tree, ExportFormat::AsciiTree, true);
        prop_assert_eq!(text.lines().count(), tree.node_count());
    }
}

fn members_tree() -> AstNode {
    AstNode::builder("Root")
        .attr("name", "x")
        .list(
            "members",
            vec![
                AstNode::builder("Member").attr("value", "a").build(),
                AstNode::builder("Member").attr("value", "b").build(),
            ],
        )
        .build()
}

#[test]
fn dot_list_slot_gets_one_pseudo_node() {
    let dot = export(&members_tree(), ExportFormat::GraphDescription, true);
    assert_eq!(dot.matches("shape=ellipse").count(), 1);
    assert_eq!(dot.matches("shape=none").count(), 3);
    for id in ["n0", "n1", "n2", "n3"] {
        assert!(dot.contains(&format!("\n{} [", id)), "missing {}", id);
    }
    assert!(!dot.contains("\nn4 ["));
}

#[test]
fn json_list_slot_keeps_plural_key() {
    let json = export(&members_tree(), ExportFormat::ObjectNotation, true);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let members = value["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1]["value"], "b");
    assert!(json.contains(r#""members":[{"#));
}

#[test]
fn cypher_root_and_child() {
    let tree = AstNode::builder("Root")
        .child("body", Some(AstNode::builder("Block").build()))
        .build();
    let script = export(&tree, ExportFormat::GraphQueryScript, true);
    assert_eq!(script.matches("MERGE(").count(), 2);
    assert_eq!(script.matches("MERGE (n0)<-[:PARENT]-(n1)").count(), 1);
}

#[test]
fn summaries() {
    assert_eq!(summarize("int i;\n"), "int i;");
    assert_eq!(summarize("new Object(){\n    int i;\n}"), "new Object(){...}");
}

#[test]
fn escaping_differs_per_format() {
    let tree = AstNode::builder("Root").attr("v", "<a & 'b' \"c\">").build();

    let dot = export(&tree, ExportFormat::GraphDescription, true);
    assert!(dot.contains("&lt;a &amp; &#39;b&#39; &quot;c&quot;&gt;"));

    let json = export(&tree, ExportFormat::ObjectNotation, true);
    assert!(json.contains(r#""v":"<a & 'b' \"c\">""#));

    let cypher = export(&tree, ExportFormat::GraphQueryScript, true);
    assert!(cypher.contains(r#"v: '<a & \'b\' "c">'"#));

    let graphml = export(&tree, ExportFormat::GraphMarkup, true);
    assert!(graphml.contains(r#"<data key="v">&lt;a & 'b' "c"&gt;</data>"#));
}

#[test]
fn concurrent_exports_use_independent_sessions() {
    let tree = members_tree();
    let expected = export(&tree, ExportFormat::GraphMarkup, true);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| export(&tree, ExportFormat::GraphMarkup, true)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
