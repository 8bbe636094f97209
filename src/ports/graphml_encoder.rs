//! Graph-markup (GraphML) encoder
//!
//! GraphML declares every `<key>` before the `<graph>` body, but the set of
//! attribute names is only known after the whole tree has been visited. Node and
//! edge fragments are therefore buffered during the walk and the document is
//! assembled in `finish`.

use crate::domain::node::NodeView;
use crate::domain::text::escape_graphml;
use crate::ports::Encoder;
use std::collections::BTreeSet;

const DATA_INDENT: &str = "            ";
const EDGE_INDENT: &str = "        ";
const GRAPH_INDENT: &str = "    ";
const KEY_INDENT: &str = "    ";
const NODE_INDENT: &str = "        ";

const EDGE_LABEL: &str = "PARENT";

const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\"\n",
    "         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n",
    "         xsi:schemaLocation=\"http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd\">\n",
);

pub struct GraphMlEncoder {
    include_type_name: bool,
    node_keys: BTreeSet<String>,
    edge_keys: BTreeSet<String>,
    nodes: Vec<String>,
    edges: Vec<String>,
}

impl GraphMlEncoder {
    pub fn new(include_type_name: bool) -> Self {
        Self {
            include_type_name,
            node_keys: BTreeSet::new(),
            edge_keys: BTreeSet::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn attribute(name: &str, value: &str) -> String {
        format!(" {}=\"{}\"", name, value)
    }

    fn data_entry(key: &str, value: &str) -> String {
        format!("<data{}>{}</data>", Self::attribute("key", key), escape_graphml(value))
    }

    fn key_entry(name: &str, elem_type: &str) -> String {
        format!(
            "<key{}{}{}{}/>",
            Self::attribute("id", name),
            Self::attribute("for", elem_type),
            Self::attribute("attr.name", name),
            Self::attribute("attr.type", "string"),
        )
    }
}

impl<N: NodeView> Encoder<N> for GraphMlEncoder {
    fn emit_node(&mut self, id: &str, _slot: &str, node: &N) {
        let type_name = node.type_name();

        self.node_keys.insert("id".to_string());
        self.node_keys.insert("labels".to_string());

        let mut fragment = String::new();
        fragment.push_str(NODE_INDENT);
        fragment.push_str(&format!(
            "<node{}{}>",
            Self::attribute("id", id),
            Self::attribute("labels", &format!(":Node:{}", type_name)),
        ));

        if self.include_type_name {
            self.node_keys.insert("type".to_string());
            fragment.push('\n');
            fragment.push_str(DATA_INDENT);
            fragment.push_str(&Self::data_entry("type", type_name));
        }

        for (name, value) in node.attributes() {
            self.node_keys.insert(name.to_string());
            fragment.push('\n');
            fragment.push_str(DATA_INDENT);
            fragment.push_str(&Self::data_entry(name, &value));
        }

        fragment.push('\n');
        fragment.push_str(NODE_INDENT);
        fragment.push_str("</node>");
        self.nodes.push(fragment);
    }

    fn emit_edge(&mut self, edge_id: &str, parent_id: &str, child_id: &str) {
        for key in ["id", "source", "target", "label"] {
            self.edge_keys.insert(key.to_string());
        }

        // GraphML edges point from child to parent
        let mut fragment = String::new();
        fragment.push_str(EDGE_INDENT);
        fragment.push_str(&format!(
            "<edge{}{}{}{}>",
            Self::attribute("id", edge_id),
            Self::attribute("source", child_id),
            Self::attribute("target", parent_id),
            Self::attribute("label", EDGE_LABEL),
        ));
        fragment.push('\n');
        fragment.push_str(DATA_INDENT);
        fragment.push_str(&Self::data_entry(EDGE_LABEL, EDGE_LABEL));
        fragment.push('\n');
        fragment.push_str(EDGE_INDENT);
        fragment.push_str("</edge>");
        self.edges.push(fragment);
    }

    fn finish(self) -> String {
        let mut output = String::from(HEADER);

        for key in &self.node_keys {
            output.push('\n');
            output.push_str(KEY_INDENT);
            output.push_str(&Self::key_entry(key, "node"));
        }
        for key in &self.edge_keys {
            output.push('\n');
            output.push_str(KEY_INDENT);
            output.push_str(&Self::key_entry(key, "edge"));
        }

        output.push('\n');
        output.push_str(GRAPH_INDENT);
        output.push_str("<graph id=\"G\" edgedefault=\"directed\">");
        for node in &self.nodes {
            output.push('\n');
            output.push_str(node);
        }
        for edge in &self.edges {
            output.push('\n');
            output.push_str(edge);
        }
        output.push('\n');
        output.push_str(GRAPH_INDENT);
        output.push_str("</graph>");
        output.push('\n');
        output.push_str("</graphml>");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::AstNode;
    use crate::domain::traversal::run;

    fn key_ids(doc: &str, elem: &str) -> Vec<String> {
        doc.lines()
            .filter(|l| l.trim_start().starts_with("<key ") && l.contains(&format!("for=\"{}\"", elem)))
            .filter_map(|l| l.split("id=\"").nth(1))
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_keys_sorted_and_declared_before_graph() {
        let tree = AstNode::builder("Root")
            .attr("zeta", "1")
            .attr("alpha", "2")
            .child("body", Some(AstNode::builder("Block").attr("mid", "3").build()))
            .build();
        let doc = run(&tree, GraphMlEncoder::new(true));

        assert_eq!(key_ids(&doc, "node"), ["alpha", "id", "labels", "mid", "type", "zeta"]);
        assert_eq!(key_ids(&doc, "edge"), ["id", "label", "source", "target"]);
        let last_key = doc.rfind("<key ").unwrap();
        assert!(last_key < doc.find("<graph ").unwrap());
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<graphml"));
        assert!(doc.ends_with("\n    </graph>\n</graphml>"));
    }

    #[test]
    fn test_fragments() {
        let tree = AstNode::builder("Root")
            .attr("expr", "a < b && c > d")
            .list("items", vec![AstNode::builder("Leaf").build()])
            .build();
        let doc = run(&tree, GraphMlEncoder::new(true));

        assert!(doc.contains(concat!(
            "        <node id=\"n0\" labels=\":Node:Root\">\n",
            "            <data key=\"type\">Root</data>\n",
            "            <data key=\"expr\">a &lt; b && c &gt; d</data>\n",
            "        </node>"
        )));
        assert!(doc.contains(concat!(
            "        <edge id=\"e0\" source=\"n1\" target=\"n0\" label=\"PARENT\">\n",
            "            <data key=\"PARENT\">PARENT</data>\n",
            "        </edge>"
        )));
        // every node before any edge
        assert!(doc.rfind("</node>").unwrap() < doc.find("<edge ").unwrap());
    }

    #[test]
    fn test_single_node_has_no_edge_keys() {
        let doc = run(&AstNode::builder("Root").build(), GraphMlEncoder::new(false));
        assert!(key_ids(&doc, "edge").is_empty());
        assert_eq!(key_ids(&doc, "node"), ["id", "labels"]);
        assert!(!doc.contains("<data key=\"type\">"));
    }
}
