// Domain model for AST Lens: the Node View contract, per-export session state,
// the canonical traversal and the text utilities the encoders share.

pub mod format;
pub mod node;
pub mod session;
pub mod text;
pub mod traversal;

pub use format::{AsciiNodeFormat, ExportFormat, ExportOptions, FormatParseError};
pub use node::{AstNode, AstNodeBuilder, NodeFlags, NodeView, SourceRange, SourceSlice};
pub use session::ExportSession;
