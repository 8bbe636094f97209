//! Object-notation (JSON) encoder
//!
//! Produces one compact nested object per node. Scalar values are always emitted as
//! strings; only the range keys are numbers.

use crate::domain::node::NodeView;
use crate::domain::session::ExportSession;
use crate::domain::text::quote_json;
use crate::ports::Encoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    has_entries: bool,
}

pub struct JsonEncoder {
    include_type_name: bool,
    out: String,
    stack: Vec<Frame>,
}

impl JsonEncoder {
    pub fn new(include_type_name: bool) -> Self {
        Self {
            include_type_name,
            out: String::new(),
            stack: Vec::new(),
        }
    }

    /// Separator before the next entry of the innermost container.
    fn open_entry(&mut self) -> Option<FrameKind> {
        let frame = self.stack.last_mut()?;
        if frame.has_entries {
            self.out.push(',');
        }
        frame.has_entries = true;
        Some(frame.kind)
    }

    fn scalar_entries<N: NodeView>(&self, node: &N) -> Vec<String> {
        let mut content = Vec::new();
        if self.include_type_name {
            content.push(format!("{}:{}", quote_json("_type"), quote_json(node.type_name())));
        }
        for (name, value) in node.attributes() {
            content.push(format!("{}:{}", quote_json(name), quote_json(&value)));
        }
        if let Some(range) = node.range() {
            content.push(format!("{}:{}", quote_json("_start_line"), range.start_line));
            content.push(format!("{}:{}", quote_json("_start_column"), range.start_column));
            content.push(format!("{}:{}", quote_json("_end_line"), range.end_line));
            content.push(format!("{}:{}", quote_json("_end_column"), range.end_column));
        }
        if let Some(type_name) = node.constructed_type_name() {
            content.push(format!("{}:{}", quote_json("_typeNameString"), quote_json(&type_name)));
        }
        content
    }
}

impl<N: NodeView> Encoder<N> for JsonEncoder {
    fn emit_node(&mut self, _id: &str, slot: &str, node: &N) {
        if self.open_entry() == Some(FrameKind::Object) {
            self.out.push_str(&quote_json(slot));
            self.out.push(':');
        }
        let content = self.scalar_entries(node);
        self.out.push('{');
        self.out.push_str(&content.join(","));
        self.stack.push(Frame {
            kind: FrameKind::Object,
            has_entries: !content.is_empty(),
        });
    }

    fn emit_edge(&mut self, _edge_id: &str, _parent_id: &str, _child_id: &str) {}

    fn enter_list(
        &mut self,
        _session: &mut ExportSession,
        _parent_id: &str,
        slot: &str,
        _len: usize,
    ) -> Option<String> {
        self.open_entry();
        // arrays keep the plural slot name
        self.out.push_str(&quote_json(slot));
        self.out.push_str(":[");
        self.stack.push(Frame {
            kind: FrameKind::Array,
            has_entries: false,
        });
        None
    }

    fn leave_list(&mut self, _slot: &str) {
        self.out.push(']');
        self.stack.pop();
    }

    fn leave_node(&mut self, _id: &str, _slot: &str, _node: &N) {
        self.out.push('}');
        self.stack.pop();
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::{AstNode, SourceRange};
    use crate::domain::traversal::run;

    #[test]
    fn test_nested_layout() {
        let tree = AstNode::builder("Root")
            .attr("name", "x")
            .range(Some(SourceRange::new(1, 1, 4, 2)))
            .child("body", Some(AstNode::builder("Block").build()))
            .list(
                "members",
                vec![
                    AstNode::builder("Member").attr("v", "a").build(),
                    AstNode::builder("Member").attr("v", "b").build(),
                ],
            )
            .build();

        let json = run(&tree, JsonEncoder::new(true));
        assert_eq!(
            json,
            concat!(
                r#"{"_type":"Root","name":"x","_start_line":1,"_start_column":1,"_end_line":4,"_end_column":2,"#,
                r#""body":{"_type":"Block"},"#,
                r#""members":[{"_type":"Member","v":"a"},{"_type":"Member","v":"b"}]}"#
            )
        );
    }

    #[test]
    fn test_without_type_and_empty_objects() {
        let tree = AstNode::builder("Root")
            .child("body", Some(AstNode::builder("Block").build()))
            .list("items", vec![AstNode::builder("Leaf").build()])
            .build();
        let json = run(&tree, JsonEncoder::new(false));
        assert_eq!(json, r#"{"body":{},"items":[{}]}"#);
    }

    #[test]
    fn test_constructed_type_name_key() {
        let tree = AstNode::builder("ExprStruct")
            .constructed_type("Point")
            .build();
        let json = run(&tree, JsonEncoder::new(true));
        assert_eq!(json, r#"{"_type":"ExprStruct","_typeNameString":"Point"}"#);
    }

    #[test]
    fn test_output_parses_with_awkward_values() {
        let tree = AstNode::builder("Root")
            .attr("quote", "say \"hi\"")
            .attr("path", "C:\\temp\\")
            .attr("lines", "a\r\nb\n")
            .list("members", vec![AstNode::builder("M").attr("x", "\\\"").build()])
            .build();
        let json = run(&tree, JsonEncoder::new(true));
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["quote"], "say \"hi\"");
        assert_eq!(value["path"], "C:\\temp\\");
        assert_eq!(value["lines"], "a\r\nb\n");
        assert_eq!(value["members"][0]["x"], "\\\"");
    }
}
