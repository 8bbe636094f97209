use cargo_metadata::MetadataCommand;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// One Rust source file queued for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Owning crate when discovered through a workspace.
    pub crate_name: Option<String>,
    pub path: PathBuf,
    pub content: String,
}

pub struct ProjectLoader;

impl ProjectLoader {
    pub fn load_file(path: &Path) -> Result<SourceFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;
        Ok(SourceFile {
            crate_name: None,
            path: path.to_path_buf(),
            content,
        })
    }

    /// All `.rs` files below `dir`, skipping `target` and `.git`.
    pub fn load_folder(dir: &Path) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        Self::collect_rs_recursive(dir, None, &mut files)?;
        Self::sort_and_dedup(&mut files);
        Ok(files)
    }

    /// Load all source files of the lib, bin and proc-macro targets of a Cargo workspace.
    pub fn load_workspace(manifest_path: &Path) -> Result<Vec<SourceFile>> {
        let metadata = MetadataCommand::new()
            .manifest_path(manifest_path)
            .no_deps()
            .exec()
            .context("Failed to execute cargo metadata")?;

        let mut files = Vec::new();

        for package_id in &metadata.workspace_members {
            let Some(package) = metadata.packages.iter().find(|p| &p.id == package_id) else {
                continue;
            };
            for target in &package.targets {
                if !target.kind.iter().any(|k| k == "lib" || k == "bin" || k == "proc-macro") {
                    continue;
                }
                let src_path = &target.src_path;
                let src_dir = src_path.parent().unwrap_or(src_path);
                Self::collect_rs_recursive(src_dir.as_std_path(), Some(&package.name), &mut files)?;
            }
        }

        // lib and bin targets usually share src/
        Self::sort_and_dedup(&mut files);
        debug!("workspace {} has {} source files", manifest_path.display(), files.len());
        Ok(files)
    }

    fn sort_and_dedup(files: &mut Vec<SourceFile>) {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
    }

    fn collect_rs_recursive(
        dir: &Path,
        crate_name: Option<&str>,
        out: &mut Vec<SourceFile>,
    ) -> Result<()> {
        if dir.ends_with("target") || dir.ends_with(".git") {
            return Ok(());
        }
        if !dir.exists() {
            warn!("Skipping missing path {}", dir.display());
            return Ok(());
        }

        if dir.is_file() {
            if dir.extension().is_some_and(|ext| ext == "rs") {
                out.push(Self::read(dir, crate_name)?);
            }
            return Ok(());
        }

        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to list directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                Self::collect_rs_recursive(&path, crate_name, out)?;
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                out.push(Self::read(&path, crate_name)?);
            }
        }
        Ok(())
    }

    fn read(path: &Path, crate_name: Option<&str>) -> Result<SourceFile> {
        let mut file = Self::load_file(path)?;
        file.crate_name = crate_name.map(str::to_string);
        Ok(file)
    }
}
