// Infrastructure implementations for AST Lens.

pub mod concurrency;
pub mod config;
pub mod lowering;
pub mod project_loader;
pub mod type_resolver;

pub use config::AppConfig;
pub use lowering::Lowering;
pub use project_loader::{ProjectLoader, SourceFile};
pub use type_resolver::SynTypeResolver;

use crate::domain::node::AstNode;
use crate::ports::SourceParser;
use anyhow::Context;
use std::sync::Arc;

const BOM: char = '\u{feff}';

/// Parses Rust source with `syn` and lowers it into an [`AstNode`] tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct SynAstParser;

impl SourceParser for SynAstParser {
    fn parse(&self, path: &str, src: &str) -> anyhow::Result<AstNode> {
        let src = src.strip_prefix(BOM).unwrap_or(src);
        let file = syn::parse_file(src).map_err(|e| {
            let at = e.span().start();
            anyhow::anyhow!("{} at {}:{}", e, at.line, at.column + 1)
        })
        .with_context(|| format!("Failed to parse {}", path))?;
        Ok(Lowering::new(Arc::from(src)).file(&file))
    }
}
