// Application layer: format dispatch and the export use cases.

use crate::domain::format::{ExportFormat, ExportOptions};
use crate::domain::node::{AstNode, NodeView};
use crate::domain::traversal::run;
use crate::infrastructure::project_loader::SourceFile;
use crate::ports::{
    AsciiTreeEncoder, CypherEncoder, DotEncoder, GraphMlEncoder, JsonEncoder, SourceParser,
    TypeResolver,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Export `root` in `format`. Every call uses a fresh export session.
pub fn export<N: NodeView>(root: &N, format: ExportFormat, include_type_name: bool) -> String {
    let options = ExportOptions {
        include_type_name,
        ..ExportOptions::default()
    };
    export_with(root, format, &options, None)
}

/// Export with full options. `resolver` is only consulted by the DOT encoder and only
/// when `options.resolve_types` is set.
pub fn export_with<N: NodeView>(
    root: &N,
    format: ExportFormat,
    options: &ExportOptions,
    resolver: Option<&dyn TypeResolver<N>>,
) -> String {
    match format {
        ExportFormat::GraphDescription => {
            let mut encoder = DotEncoder::new(options.include_type_name);
            if let Some(resolver) = resolver.filter(|_| options.resolve_types) {
                encoder = encoder.with_resolver(resolver);
            }
            run(root, encoder)
        }
        ExportFormat::ObjectNotation => run(root, JsonEncoder::new(options.include_type_name)),
        ExportFormat::GraphQueryScript => run(root, CypherEncoder::new(options.include_type_name)),
        ExportFormat::GraphMarkup => run(root, GraphMlEncoder::new(options.include_type_name)),
        ExportFormat::AsciiTree => run(root, AsciiTreeEncoder::with_format(options.ascii_format)),
    }
}

/// Result of exporting one file.
#[derive(Debug)]
pub struct ExportedDocument {
    pub document: String,
    pub node_count: usize,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub crate_name: Option<String>,
    pub result: Result<ExportedDocument>,
}

/// One line of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub node_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchManifest {
    pub format: String,
    pub include_type_name: bool,
    pub exported: usize,
    pub failed: usize,
    pub files: Vec<ManifestEntry>,
}

/// Flat output file name for a source path: separators become `__`.
pub fn output_file_name(path: &Path, format: ExportFormat) -> String {
    let flat = path
        .to_string_lossy()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .replace(['/', '\\'], "__")
        .replace(':', "");
    format!("{}.{}", flat, format.extension())
}

/// `output_file_name`, suffixed with `-1`, `-2`, ... until it is not in `taken`.
fn unique_output_name(path: &Path, format: ExportFormat, taken: &mut HashSet<String>) -> String {
    let base = output_file_name(path, format);
    if taken.insert(base.clone()) {
        return base;
    }
    let suffix = format!(".{}", format.extension());
    let stem = base.strip_suffix(&suffix).unwrap_or(&base);
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}{}", stem, n, suffix);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

pub struct ExportUsecase<'a> {
    pub parser: &'a dyn SourceParser,
    pub resolver: &'a dyn TypeResolver<AstNode>,
    pub format: ExportFormat,
    pub options: ExportOptions,
}

impl<'a> ExportUsecase<'a> {
    /// Parse and export a single source.
    pub fn run(&self, path: &str, src: &str) -> Result<ExportedDocument> {
        let root = self.parser.parse(path, src)?;
        let document = export_with(&root, self.format, &self.options, Some(self.resolver));
        let node_count = root.node_count();
        debug!(
            "exported {} ({} nodes, {} bytes as {})",
            path,
            node_count,
            document.len(),
            self.format
        );
        Ok(ExportedDocument {
            document,
            node_count,
        })
    }

    /// Export every file in parallel on the current rayon pool. Each export owns its
    /// session; outcomes keep the input order.
    pub fn run_batch(&self, files: &[SourceFile]) -> Vec<ExportOutcome> {
        let outcomes: Vec<ExportOutcome> = files
            .par_iter()
            .map(|file| ExportOutcome {
                path: file.path.clone(),
                crate_name: file.crate_name.clone(),
                result: self.run(&file.path.to_string_lossy(), &file.content),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            "Batch export finished: {} exported, {} failed ({})",
            outcomes.len() - failed,
            failed,
            self.format
        );
        outcomes
    }

    /// Write every successful document into `out_dir` followed by `manifest.json`.
    ///
    /// Sources whose flat names collide get a numeric suffix. Failed sources are listed
    /// in the manifest with their error and no output.
    pub fn write_batch(&self, outcomes: &[ExportOutcome], out_dir: &Path) -> Result<BatchManifest> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

        let mut taken = HashSet::from([MANIFEST_FILE.to_string()]);
        let mut files = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let source = outcome.path.display().to_string();
            let entry = match &outcome.result {
                Ok(exported) => {
                    let name = unique_output_name(&outcome.path, self.format, &mut taken);
                    let target = out_dir.join(&name);
                    fs::write(&target, &exported.document)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    ManifestEntry {
                        source,
                        crate_name: outcome.crate_name.clone(),
                        output: Some(name),
                        node_count: exported.node_count,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", source, e);
                    ManifestEntry {
                        source,
                        crate_name: outcome.crate_name.clone(),
                        output: None,
                        node_count: 0,
                        error: Some(format!("{:#}", e)),
                    }
                }
            };
            files.push(entry);
        }

        let failed = files.iter().filter(|f| f.error.is_some()).count();
        let manifest = BatchManifest {
            format: self.format.name().to_string(),
            include_type_name: self.options.include_type_name,
            exported: files.len() - failed,
            failed,
            files,
        };
        let manifest_path = out_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        Ok(manifest)
    }
}
