//! File configuration for the `ast_lens` binary.

use crate::domain::format::{ExportFormat, ExportOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_WORKER_STACK_SIZE_MB: usize = 64;

/// Settings read from a TOML file. Command-line flags take precedence.
///
/// ```toml
/// format = "json"
/// worker_stack_size_mb = 128
///
/// [export]
/// include_type_name = false
/// ascii_format = "summary-type"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub format: ExportFormat,
    pub export: ExportOptions,
    /// Stack size of batch workers; deep trees recurse once per level.
    pub worker_stack_size_mb: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            export: ExportOptions::default(),
            worker_stack_size_mb: DEFAULT_WORKER_STACK_SIZE_MB,
        }
    }
}

impl AppConfig {
    /// Load configuration from file. A missing path yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(AppConfig::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }
}
