//! Graph-description (DOT) encoder
//!
//! Every AST node becomes a `shape=none` node whose label is an HTML-like table: a
//! header cell with the slot name, type and range, then one row per attribute.
//! List slots get an extra ellipse pseudo-node between the owner and the items.

use crate::domain::node::NodeView;
use crate::domain::session::ExportSession;
use crate::domain::text::{escape_dot, escape_html, escape_whitespace, node_summary};
use crate::ports::{Encoder, TypeResolver};
use tracing::debug;

const LIST_COLOR: &str = "OrangeRed";

pub struct DotEncoder<'a, N: NodeView> {
    include_type_name: bool,
    resolver: Option<&'a dyn TypeResolver<N>>,
    out: String,
    last_color: &'static str,
}

impl<'a, N: NodeView> DotEncoder<'a, N> {
    pub fn new(include_type_name: bool) -> Self {
        Self {
            include_type_name,
            resolver: None,
            out: String::from("digraph {"),
            last_color: "black",
        }
    }

    /// Enable the `Resolved Type` line for expression nodes.
    pub fn with_resolver(mut self, resolver: &'a dyn TypeResolver<N>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Colour precedence: comment slot, name slot, string literal, default.
    fn line_color(slot: &str, node: &N) -> &'static str {
        if slot == "comment" {
            "LightGray"
        } else if slot == "name" {
            "SteelBlue"
        } else if node.is_string_literal() {
            "SeaGreen"
        } else {
            "black"
        }
    }

    fn resolved_type(&self, node: &N) -> Option<String> {
        let resolver = self.resolver?;
        if !node.is_expression() {
            return None;
        }
        match resolver.resolve(node) {
            Ok(ty) => Some(escape_html(&ty)),
            Err(e) => {
                debug!(
                    "Unable to resolve type of \"{}\" ({})",
                    escape_whitespace(&node_summary(node)),
                    e
                );
                None
            }
        }
    }

    fn attribute_row(name: &str, value: &str) -> String {
        let lines: Vec<&str> = value
            .trim()
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        let align = if lines.len() > 1 { "left" } else { "center" };

        let mut row = String::new();
        row.push_str("<tr>");
        row.push_str(&format!("<td>{}</td>", name));
        row.push_str("<td align='left'>");
        row.push_str("<table border='0' cellspacing='0' cellpadding='0'>");
        for line in lines {
            row.push_str(&format!(
                "<tr><td align='{}'>{}</td></tr>",
                align,
                escape_html(line)
            ));
        }
        row.push_str("</table>");
        row.push_str("</td>");
        row.push_str("</tr>");
        row
    }
}

impl<'a, N: NodeView> Encoder<N> for DotEncoder<'a, N> {
    fn emit_node(&mut self, id: &str, slot: &str, node: &N) {
        let color = Self::line_color(slot, node);
        let range = node.range().map(|r| r.to_string()).unwrap_or_default();

        let mut dot = String::new();
        dot.push('\n');
        dot.push_str(id);
        dot.push_str(" [shape=none,label=<");
        dot.push_str(&format!("<font color='{}'>", color));
        dot.push_str(&format!(
            "<table border='0' color='{}' cellspacing='0' cellborder='1'>",
            color
        ));
        dot.push_str("<tr><td colspan='2'>");
        dot.push_str(&format!("<font color='{}'>", color));
        dot.push_str(&escape_dot(slot));
        if self.include_type_name {
            dot.push_str(&format!(" ({})", node.type_name()));
        }
        dot.push_str("</font>");
        dot.push_str("<br/>");
        dot.push_str(&format!("<font color='#aaaaaa' size='8'>{}</font>", range));

        if let Some(resolved) = self.resolved_type(node) {
            dot.push_str("<br/>");
            dot.push_str(&format!(
                "<font color='red' size='8'>Resolved Type: {}</font>",
                resolved
            ));
        }
        dot.push_str("</td></tr>");

        for (name, value) in node.attributes() {
            dot.push_str(&Self::attribute_row(name, &value));
        }

        dot.push_str("</table>");
        dot.push_str("</font>");
        dot.push_str(">];");

        self.out.push_str(&dot);
        self.last_color = color;
    }

    fn emit_edge(&mut self, _edge_id: &str, parent_id: &str, child_id: &str) {
        // the edge into a node always follows that node's emission
        self.out.push_str(&format!(
            "\n{} -> {} [color = {}];",
            parent_id, child_id, self.last_color
        ));
    }

    fn enter_list(
        &mut self,
        session: &mut ExportSession,
        parent_id: &str,
        slot: &str,
        _len: usize,
    ) -> Option<String> {
        let list_id = session.next_node_id();
        self.out.push_str(&format!(
            "\n{} [shape=ellipse,color={},label=\"{}\"];",
            list_id,
            LIST_COLOR,
            escape_dot(slot)
        ));
        self.out.push_str(&format!(
            "\n{} -> {} [color = {}];",
            parent_id, list_id, LIST_COLOR
        ));
        Some(list_id)
    }

    fn finish(mut self) -> String {
        self.out.push_str("\n}");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{AstNode, SourceRange};
    use crate::domain::traversal::run;
    use crate::ports::ResolveError;

    fn sample() -> AstNode {
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
    fn test_list_pseudo_node_consumes_an_id() {
        let dot = run(&sample(), DotEncoder::new(true));
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("\n}"));
        assert!(dot.contains("\nn0 [shape=none"));
        assert!(dot.contains("\nn1 [shape=ellipse,color=OrangeRed,label=\"members\"];"));
        assert!(dot.contains("\nn0 -> n1 [color = OrangeRed];"));
        assert!(dot.contains("\nn2 [shape=none"));
        assert!(dot.contains("\nn3 [shape=none"));
        assert!(dot.contains("\nn1 -> n2 [color = black];"));
        assert!(dot.contains("\nn1 -> n3 [color = black];"));
        assert!(!dot.contains("n4"));
        assert_eq!(dot.matches("shape=ellipse").count(), 1);
        assert_eq!(dot.matches("shape=none").count(), 3);
    }

    #[test]
    fn test_header_with_and_without_type() {
        let node = AstNode::builder("Root")
            .range(Some(SourceRange::new(1, 1, 2, 3)))
            .build();
        let with_type = run(&node, DotEncoder::new(true));
        assert!(with_type.contains("<font color='black'>root (Root)</font><br/><font color='#aaaaaa' size='8'>[1:1-2:3]</font>"));

        let without_type = run(&node, DotEncoder::new(false));
        assert!(without_type.contains("<font color='black'>root</font><br/><font color='#aaaaaa' size='8'>[1:1-2:3]</font>"));
        assert!(!without_type.contains("(Root)"));

        let no_range = run(&AstNode::builder("Root").build(), DotEncoder::new(false));
        assert!(no_range.contains("<font color='#aaaaaa' size='8'></font>"));
    }

    #[test]
    fn test_colors() {
        let tree = AstNode::builder("Root")
            .child("comment", Some(AstNode::builder("DocComment").build()))
            .child("name", Some(AstNode::builder("Ident").build()))
            .child("value", Some(AstNode::builder("ExprLit").string_literal().build()))
            .build();
        let dot = run(&tree, DotEncoder::new(true));
        assert!(dot.contains("\nn0 -> n1 [color = LightGray];"));
        assert!(dot.contains("\nn0 -> n2 [color = SteelBlue];"));
        assert!(dot.contains("\nn0 -> n3 [color = SeaGreen];"));
    }

    #[test]
    fn test_attribute_escaping_and_alignment() {
        let tree = AstNode::builder("Root")
            .attr("single", "a < b & \"c\"")
            .attr("multi", "line1\r\nline2\n")
            .build();
        let dot = run(&tree, DotEncoder::new(true));
        assert!(dot.contains("<tr><td>single</td><td align='left'><table border='0' cellspacing='0' cellpadding='0'><tr><td align='center'>a &lt; b &amp; &quot;c&quot;</td></tr></table></td></tr>"));
        assert!(dot.contains("<tr><td align='left'>line1</td></tr><tr><td align='left'>line2</td></tr>"));
    }

    #[test]
    fn test_slot_name_quotes_escaped() {
        let tree = AstNode::builder("Root")
            .list("say\"s", vec![AstNode::builder("Leaf").build()])
            .build();
        let dot = run(&tree, DotEncoder::new(true));
        assert!(dot.contains("label=\"say\\\"s\""));
    }

    struct FixedResolver;

    impl TypeResolver<AstNode> for FixedResolver {
        fn resolve(&self, node: &AstNode) -> Result<String, ResolveError> {
            match node.attribute("ty") {
                Some(ty) => Ok(ty.to_string()),
                None => Err(ResolveError::UnsolvedSymbol(node.type_name.clone())),
            }
        }
    }

    #[test]
    fn test_resolved_type_line_is_best_effort() {
        let tree = AstNode::builder("Root")
            .child("ok", Some(AstNode::builder("ExprLit").attr("ty", "Vec<u8>").expression().build()))
            .child("fails", Some(AstNode::builder("ExprPath").expression().build()))
            .child("not_expr", Some(AstNode::builder("Ident").attr("ty", "ignored").build()))
            .build();
        let resolver = FixedResolver;
        let dot = run(&tree, DotEncoder::new(true).with_resolver(&resolver));
        assert_eq!(dot.matches("Resolved Type:").count(), 1);
        assert!(dot.contains("<font color='red' size='8'>Resolved Type: Vec&lt;u8&gt;</font>"));
    }
}
