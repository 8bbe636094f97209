use crate::domain::node::{AstNode, NodeView};
use crate::domain::session::ExportSession;
use thiserror::Error;

pub mod ascii_tree_encoder;
pub mod cypher_encoder;
pub mod dot_encoder;
pub mod graphml_encoder;
pub mod json_encoder;

pub use ascii_tree_encoder::AsciiTreeEncoder;
pub use cypher_encoder::CypherEncoder;
pub use dot_encoder::DotEncoder;
pub use graphml_encoder::GraphMlEncoder;
pub use json_encoder::JsonEncoder;

/// One output format driven by the canonical traversal.
///
/// Callbacks arrive in pre-order: `emit_node`, then `emit_edge` when the node has a
/// parent, then the node's children, then `leave_node`. List slots are bracketed by
/// `enter_list` / `leave_list`.
pub trait Encoder<N: NodeView> {
    fn emit_node(&mut self, id: &str, slot: &str, node: &N);

    fn emit_edge(&mut self, edge_id: &str, parent_id: &str, child_id: &str);

    /// Called before the items of a non-empty list slot. Returning an id makes it the
    /// parent of the items instead of the owning node.
    fn enter_list(
        &mut self,
        _session: &mut ExportSession,
        _parent_id: &str,
        _slot: &str,
        _len: usize,
    ) -> Option<String> {
        None
    }

    fn leave_list(&mut self, _slot: &str) {}

    fn leave_node(&mut self, _id: &str, _slot: &str, _node: &N) {}

    /// Assemble the complete document.
    fn finish(self) -> String
    where
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unsolved symbol '{0}'")]
    UnsolvedSymbol(String),
    #[error("cannot resolve type of {0}")]
    Unsupported(String),
}

/// Best-effort type resolution for expression nodes.
pub trait TypeResolver<N: NodeView>: Send + Sync {
    fn resolve(&self, node: &N) -> Result<String, ResolveError>;
}

/// Turns source text into a tree the encoders can walk.
pub trait SourceParser: Send + Sync {
    fn parse(&self, path: &str, src: &str) -> anyhow::Result<AstNode>;
}
