// Main library entry point for AST Lens.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{export, export_with};
pub use domain::{ExportFormat, ExportOptions, NodeView};
