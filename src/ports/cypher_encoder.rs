//! Graph-query-script (Cypher) encoder
//!
//! Emits one `MERGE` per node and a `PARENT` relationship towards its parent. Each
//! statement is preceded by a `WITH` clause carrying every identifier still in scope.

use crate::domain::node::NodeView;
use crate::domain::text::escape_cypher;
use crate::ports::Encoder;

const EOL: &str = "\n";

pub struct CypherEncoder {
    include_type_name: bool,
    out: String,
    /// Identifiers carried by the `WITH` clause, in creation order.
    ///
    /// Entries are removed by slot name after a node's subtree is done, which never
    /// matches a generated id, so the scope only grows within one export.
    current_ids: Vec<String>,
    nodes_written: usize,
}

impl CypherEncoder {
    pub fn new(include_type_name: bool) -> Self {
        Self {
            include_type_name,
            out: String::new(),
            current_ids: Vec::new(),
            nodes_written: 0,
        }
    }

    pub fn scope(&self) -> &[String] {
        &self.current_ids
    }
}

impl<N: NodeView> Encoder<N> for CypherEncoder {
    fn emit_node(&mut self, id: &str, slot: &str, node: &N) {
        if self.nodes_written > 0 {
            self.out.push_str(EOL);
            self.out.push_str(EOL);
        }
        self.nodes_written += 1;

        if !self.current_ids.iter().any(|existing| existing == id) {
            self.current_ids.push(id.to_string());
        }

        let type_name = node.type_name();
        self.out.push_str(EOL);
        self.out.push_str(&format!("WITH {}{}", self.current_ids.join(", "), EOL));
        self.out.push_str(&format!("MERGE({}:Node:{} {{", id, type_name));

        let mut properties = Vec::new();
        if self.include_type_name {
            properties.push(format!("  type: '{}'", type_name));
        }
        properties.push(format!("  name: '{}'", escape_cypher(slot)));
        for (name, value) in node.attributes() {
            properties.push(format!("  {}: '{}'", escape_cypher(name), escape_cypher(&value)));
        }
        self.out.push_str(EOL);
        self.out.push_str(&properties.join(&format!(",{}", EOL)));
        self.out.push_str(EOL);
        self.out.push_str("})");
    }

    fn emit_edge(&mut self, _edge_id: &str, parent_id: &str, child_id: &str) {
        self.out.push_str(EOL);
        self.out
            .push_str(&format!("MERGE ({})<-[:PARENT]-({})", parent_id, child_id));
    }

    fn leave_node(&mut self, _id: &str, slot: &str, _node: &N) {
        self.current_ids.retain(|existing| existing != slot);
    }

    fn finish(mut self) -> String {
        if self.nodes_written > 0 {
            self.out.push_str(EOL);
            self.out.push_str(EOL);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::AstNode;
    use crate::domain::session::ExportSession;
    use crate::domain::traversal::walk;

    #[test]
    fn test_two_node_tree() {
        let tree = AstNode::builder("Root")
            .attr("value", "it's")
            .child("body", Some(AstNode::builder("Block").build()))
            .build();

        let mut encoder = CypherEncoder::new(true);
        walk(&tree, None, "root", &mut ExportSession::new(), &mut encoder);
        let script = <CypherEncoder as Encoder<AstNode>>::finish(encoder);

        let expected = concat!(
            "\nWITH n0\n",
            "MERGE(n0:Node:Root {\n",
            "  type: 'Root',\n",
            "  name: 'root',\n",
            "  value: 'it\\'s'\n",
            "})\n\n",
            "\nWITH n0, n1\n",
            "MERGE(n1:Node:Block {\n",
            "  type: 'Block',\n",
            "  name: 'body'\n",
            "})\n",
            "MERGE (n0)<-[:PARENT]-(n1)\n\n",
        );
        assert_eq!(script, expected);
        assert_eq!(script.matches("MERGE(").count(), 2);
        assert_eq!(script.matches("<-[:PARENT]-").count(), 1);
    }

    #[test]
    fn test_without_type_has_no_leading_comma() {
        let tree = AstNode::builder("Root").build();
        let mut encoder = CypherEncoder::new(false);
        walk(&tree, None, "root", &mut ExportSession::new(), &mut encoder);
        let script = <CypherEncoder as Encoder<AstNode>>::finish(encoder);
        assert_eq!(script, "\nWITH n0\nMERGE(n0:Node:Root {\n  name: 'root'\n})\n\n");
    }

    #[test]
    fn test_scope_is_not_trimmed_by_id() {
        let leaf = || AstNode::builder("Leaf").build();
        let tree = AstNode::builder("Root")
            .list("items", vec![leaf(), leaf(), leaf()])
            .build();

        let mut encoder = CypherEncoder::new(true);
        walk(&tree, None, "root", &mut ExportSession::new(), &mut encoder);
        assert_eq!(encoder.scope(), ["n0", "n1", "n2", "n3"]);

        let script = <CypherEncoder as Encoder<AstNode>>::finish(encoder);
        assert!(script.contains("\nWITH n0, n1, n2, n3\nMERGE(n3:Node:Leaf"));
    }

    #[test]
    fn test_scope_removal_by_slot_name() {
        // a slot literally named like an id is the only way an entry leaves the scope
        let tree = AstNode::builder("Root")
            .child("n0", Some(AstNode::builder("Odd").build()))
            .build();
        let mut encoder = CypherEncoder::new(true);
        walk(&tree, None, "root", &mut ExportSession::new(), &mut encoder);
        assert_eq!(encoder.scope(), ["n1"]);
    }
}
