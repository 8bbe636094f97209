// Node View contract for AST Lens.
// Every encoder reads the tree exclusively through `NodeView`.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Source coordinates of a node. Lines and columns are 1-based; the end column is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceRange {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}-{}:{}]",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

/// Read-only projection of one tree node.
///
/// Slot and attribute order is the declared order of the node kind and must be
/// stable across calls; the encoders derive ids and output order from it.
pub trait NodeView {
    /// Stable identifier of the node's concrete kind.
    fn type_name(&self) -> &str;

    /// Scalar attributes in declared field order.
    fn attributes(&self) -> Vec<(&str, Cow<'_, str>)>;

    /// Single-valued child slots in declared order. Absent children are `None`.
    fn singular_children(&self) -> Vec<(&str, Option<&Self>)>;

    /// Multi-valued child slots in declared order, keyed by the plural slot name.
    fn list_children(&self) -> Vec<(&str, Vec<&Self>)>;

    fn range(&self) -> Option<SourceRange>;

    /// The node's own source text with comments removed.
    fn source_text(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Whether type resolution may be attempted for this node.
    fn is_expression(&self) -> bool {
        false
    }

    fn is_string_literal(&self) -> bool {
        false
    }

    /// Name of the constructed type, present only for the object-creation kind.
    fn constructed_type_name(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Direct children: singular slots first, then list slots, each in declared order.
    fn children(&self) -> Vec<&Self> {
        let mut out: Vec<&Self> = self
            .singular_children()
            .into_iter()
            .filter_map(|(_, child)| child)
            .collect();
        for (_, items) in self.list_children() {
            out.extend(items);
        }
        out
    }
}

/// Shared source buffer plus the byte span a node covers in it.
#[derive(Debug, Clone)]
pub struct SourceSlice {
    pub source: Arc<str>,
    pub span: Range<usize>,
}

/// Owned, generic tree node implementing [`NodeView`].
///
/// Built by the source adapters (see `infrastructure::lowering`) or by hand with
/// [`AstNode::builder`].
#[derive(Debug, Clone)]
pub struct AstNode {
    pub type_name: String,
    pub attributes: Vec<(String, String)>,
    pub singular: Vec<(String, Option<Box<AstNode>>)>,
    pub lists: Vec<(String, Vec<AstNode>)>,
    pub range: Option<SourceRange>,
    pub text: Option<SourceSlice>,
    pub flags: NodeFlags,
    pub constructed_type: Option<String>,
}

/// Kind markers consumed by individual encoders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub expression: bool,
    pub string_literal: bool,
}

impl AstNode {
    pub fn builder(type_name: impl Into<String>) -> AstNodeBuilder {
        AstNodeBuilder {
            node: AstNode {
                type_name: type_name.into(),
                attributes: Vec::new(),
                singular: Vec::new(),
                lists: Vec::new(),
                range: None,
                text: None,
                flags: NodeFlags::default(),
                constructed_type: None,
            },
        }
    }

    /// Look up a singular child by slot name.
    pub fn child(&self, slot: &str) -> Option<&AstNode> {
        self.singular
            .iter()
            .find(|(name, _)| name == slot)
            .and_then(|(_, child)| child.as_deref())
    }

    /// Look up a list slot by its plural name. Missing slots read as empty.
    pub fn list(&self, slot: &str) -> &[AstNode] {
        self.lists
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .singular
            .iter()
            .filter_map(|(_, child)| child.as_deref())
            .map(AstNode::node_count)
            .sum::<usize>()
            + self
                .lists
                .iter()
                .flat_map(|(_, items)| items.iter())
                .map(AstNode::node_count)
                .sum::<usize>()
    }
}

impl NodeView for AstNode {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attributes(&self) -> Vec<(&str, Cow<'_, str>)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), Cow::Borrowed(value.as_str())))
            .collect()
    }

    fn singular_children(&self) -> Vec<(&str, Option<&Self>)> {
        self.singular
            .iter()
            .map(|(name, child)| (name.as_str(), child.as_deref()))
            .collect()
    }

    fn list_children(&self) -> Vec<(&str, Vec<&Self>)> {
        self.lists
            .iter()
            .map(|(name, items)| (name.as_str(), items.iter().collect()))
            .collect()
    }

    fn range(&self) -> Option<SourceRange> {
        self.range
    }

    fn source_text(&self) -> Option<Cow<'_, str>> {
        let slice = self.text.as_ref()?;
        let raw = slice.source.get(slice.span.clone())?;
        Some(Cow::Owned(crate::domain::text::strip_comments(raw)))
    }

    fn is_expression(&self) -> bool {
        self.flags.expression
    }

    fn is_string_literal(&self) -> bool {
        self.flags.string_literal
    }

    fn constructed_type_name(&self) -> Option<Cow<'_, str>> {
        self.constructed_type.as_deref().map(Cow::Borrowed)
    }
}

/// Fluent constructor for [`AstNode`]. Slots keep the order in which they are added.
#[derive(Debug)]
pub struct AstNodeBuilder {
    node: AstNode,
}

impl AstNodeBuilder {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.node.attributes.push((name.into(), value.into()));
        self
    }

    /// Add an attribute only when a value is present.
    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn child(mut self, slot: impl Into<String>, child: Option<AstNode>) -> Self {
        self.node.singular.push((slot.into(), child.map(Box::new)));
        self
    }

    pub fn list(mut self, slot: impl Into<String>, items: Vec<AstNode>) -> Self {
        self.node.lists.push((slot.into(), items));
        self
    }

    pub fn range(mut self, range: Option<SourceRange>) -> Self {
        self.node.range = range;
        self
    }

    pub fn text(mut self, text: Option<SourceSlice>) -> Self {
        self.node.text = text;
        self
    }

    pub fn expression(mut self) -> Self {
        self.node.flags.expression = true;
        self
    }

    pub fn string_literal(mut self) -> Self {
        self.node.flags.string_literal = true;
        self
    }

    pub fn constructed_type(mut self, name: impl Into<String>) -> Self {
        self.node.constructed_type = Some(name.into());
        self
    }

    pub fn build(self) -> AstNode {
        self.node
    }
}
