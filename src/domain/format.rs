//! Output formats and export options.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ExportFormat {
    /// Graphviz digraph with HTML-like table labels.
    GraphDescription,
    /// Nested JSON objects.
    ObjectNotation,
    /// Cypher `MERGE` script.
    GraphQueryScript,
    /// GraphML document.
    GraphMarkup,
    /// Indented box-drawing tree.
    AsciiTree,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown export format '{0}' (expected one of: dot, json, cypher, graphml, ascii)")]
pub struct FormatParseError(pub String);

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::GraphDescription,
        ExportFormat::ObjectNotation,
        ExportFormat::GraphQueryScript,
        ExportFormat::GraphMarkup,
        ExportFormat::AsciiTree,
    ];

    /// Parse a format from its short name or one of its aliases (case-insensitive).
    pub fn from_name(s: &str) -> Option<ExportFormat> {
        match s.trim().to_lowercase().as_str() {
            "dot" | "custom-dot" | "graphviz" | "graph-description" => Some(ExportFormat::GraphDescription),
            "json" | "custom-json" | "object-notation" => Some(ExportFormat::ObjectNotation),
            "cypher" | "graph-query-script" => Some(ExportFormat::GraphQueryScript),
            "graphml" | "graph-markup" => Some(ExportFormat::GraphMarkup),
            "ascii" | "ascii-tree" | "tree" => Some(ExportFormat::AsciiTree),
            _ => None,
        }
    }

    /// Canonical short name.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::GraphDescription => "dot",
            ExportFormat::ObjectNotation => "json",
            ExportFormat::GraphQueryScript => "cypher",
            ExportFormat::GraphMarkup => "graphml",
            ExportFormat::AsciiTree => "ascii",
        }
    }

    /// File extension used for batch output.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::GraphDescription => "dot",
            ExportFormat::ObjectNotation => "json",
            ExportFormat::GraphQueryScript => "cypher",
            ExportFormat::GraphMarkup => "graphml",
            ExportFormat::AsciiTree => "txt",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::GraphDescription => "Graphviz digraph, one table-labelled node per AST node",
            ExportFormat::ObjectNotation => "nested JSON objects keyed by slot name",
            ExportFormat::GraphQueryScript => "Cypher MERGE statements with PARENT relationships",
            ExportFormat::GraphMarkup => "GraphML document for graph databases",
            ExportFormat::AsciiTree => "indented text tree with source summaries",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::GraphDescription
    }
}

impl FromStr for ExportFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::from_name(s).ok_or_else(|| FormatParseError(s.to_string()))
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = FormatParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Line layout of the ASCII tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsciiNodeFormat {
    /// `"summary" TypeName : (l,c)-(l,c)`
    #[default]
    SummaryTypeRange,
    /// `"summary" [TypeName]`
    SummaryType,
}

impl AsciiNodeFormat {
    pub fn from_name(s: &str) -> Option<AsciiNodeFormat> {
        match s.trim().to_lowercase().as_str() {
            "summary-type-range" | "full" => Some(AsciiNodeFormat::SummaryTypeRange),
            "summary-type" | "short" => Some(AsciiNodeFormat::SummaryType),
            _ => None,
        }
    }
}

/// Options shared by all encoders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Include the node type name (`_type`, `type`, ` (Type)` depending on format).
    pub include_type_name: bool,
    /// Attempt best-effort type resolution in the DOT output.
    pub resolve_types: bool,
    pub ascii_format: AsciiNodeFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_type_name: true,
            resolve_types: false,
            ascii_format: AsciiNodeFormat::default(),
        }
    }
}
