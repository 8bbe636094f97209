//! ASCII-tree encoder
//!
//! One line per node, indented with compact box-drawing connectors:
//!
//! ```text
//! "let x = 1;" Local : (1,1)-(1,10)
//! ├─"x" PatIdent : (1,5)-(1,5)
//! │ └─"x" Ident : (1,5)-(1,5)
//! └─"1" ExprLit : (1,9)-(1,9)
//! ```
//!
//! List slots are flattened into the node's children and no ids are printed.

use crate::domain::format::AsciiNodeFormat;
use crate::domain::node::NodeView;
use crate::domain::text::{node_summary, range_coordinates};
use crate::ports::Encoder;

const BRANCH: &str = "├─";
const LAST_BRANCH: &str = "└─";
const CONTINUATION: &str = "│ ";
const LAST_CONTINUATION: &str = "  ";

enum LineFormat<'a, N> {
    Preset(fn(&N) -> String),
    Custom(Box<dyn Fn(&N) -> String + 'a>),
}

struct Frame {
    remaining: usize,
    child_prefix: String,
}

pub struct AsciiTreeEncoder<'a, N: NodeView> {
    line_format: LineFormat<'a, N>,
    out: String,
    stack: Vec<Frame>,
}

/// `"summary" TypeName : (l,c)-(l,c)`
pub fn summary_type_range<N: NodeView>(node: &N) -> String {
    format!(
        "\"{}\" {} : {}",
        node_summary(node),
        node.type_name(),
        range_coordinates(node.range())
    )
}

/// `"summary" [TypeName]`
pub fn summary_type<N: NodeView>(node: &N) -> String {
    format!("\"{}\" [{}]", node_summary(node), node.type_name())
}

impl<'a, N: NodeView> AsciiTreeEncoder<'a, N> {
    pub fn new() -> Self {
        Self::with_format(AsciiNodeFormat::default())
    }

    pub fn with_format(format: AsciiNodeFormat) -> Self {
        let preset: fn(&N) -> String = match format {
            AsciiNodeFormat::SummaryTypeRange => summary_type_range::<N>,
            AsciiNodeFormat::SummaryType => summary_type::<N>,
        };
        Self::with_line_format(LineFormat::Preset(preset))
    }

    /// Render every line with a caller-supplied function.
    pub fn with_node_format(format: impl Fn(&N) -> String + 'a) -> Self {
        Self::with_line_format(LineFormat::Custom(Box::new(format)))
    }

    fn with_line_format(line_format: LineFormat<'a, N>) -> Self {
        Self {
            line_format,
            out: String::new(),
            stack: Vec::new(),
        }
    }

    fn render(&self, node: &N) -> String {
        match &self.line_format {
            LineFormat::Preset(f) => f(node),
            LineFormat::Custom(f) => f(node),
        }
    }
}

impl<'a, N: NodeView> Default for AsciiTreeEncoder<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, N: NodeView> Encoder<N> for AsciiTreeEncoder<'a, N> {
    fn emit_node(&mut self, _id: &str, _slot: &str, node: &N) {
        let (prefix, child_prefix) = match self.stack.last_mut() {
            None => (String::new(), String::new()),
            Some(parent) => {
                parent.remaining = parent.remaining.saturating_sub(1);
                if parent.remaining == 0 {
                    (
                        format!("{}{}", parent.child_prefix, LAST_BRANCH),
                        format!("{}{}", parent.child_prefix, LAST_CONTINUATION),
                    )
                } else {
                    (
                        format!("{}{}", parent.child_prefix, BRANCH),
                        format!("{}{}", parent.child_prefix, CONTINUATION),
                    )
                }
            }
        };

        let line = self.render(node);
        self.out.push_str(&prefix);
        self.out.push_str(&line);
        self.out.push('\n');

        self.stack.push(Frame {
            remaining: node.children().len(),
            child_prefix,
        });
    }

    fn emit_edge(&mut self, _edge_id: &str, _parent_id: &str, _child_id: &str) {}

    fn leave_node(&mut self, _id: &str, _slot: &str, _node: &N) {
        self.stack.pop();
    }

    fn finish(self) -> String {
        self.out
    }
}
