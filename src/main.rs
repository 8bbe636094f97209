// Command-line entry point for AST Lens.

use anyhow::{bail, Context, Result};
use ast_lens::application::ExportUsecase;
use ast_lens::domain::text::{pad_end, pad_start};
use ast_lens::domain::{AsciiNodeFormat, ExportFormat};
use ast_lens::infrastructure::concurrency::build_export_pool;
use ast_lens::infrastructure::{AppConfig, ProjectLoader, SourceFile, SynAstParser, SynTypeResolver};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input source file path (can specify multiple)
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Input source folder(s)
    #[arg(short = 'd', long)]
    folder: Vec<PathBuf>,

    /// Workspace Cargo.toml
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Output format (dot, json, cypher, graphml, ascii)
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Output file for a single input (stdout when absent)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory for batch exports
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Omit node type names from the output
    #[arg(long)]
    no_type_name: bool,

    /// Annotate DOT nodes with best-effort expression types
    #[arg(long)]
    resolve_types: bool,

    /// Line format of the ASCII tree (summary-type-range, summary-type)
    #[arg(long, value_parser = parse_ascii_format)]
    ascii_format: Option<AsciiNodeFormat>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the supported formats and exit
    #[arg(long)]
    list_formats: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_ascii_format(s: &str) -> Result<AsciiNodeFormat, String> {
    AsciiNodeFormat::from_name(s).ok_or_else(|| format!("unknown ASCII node format '{}'", s))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn list_formats() {
    for format in ExportFormat::ALL {
        println!(
            "{}{}{}",
            pad_end(format.name(), 9),
            pad_end(&format!(".{}", format.extension()), 10),
            format.description()
        );
    }
}

fn collect_sources(cli: &Cli) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();

    for input in &cli.input {
        match ProjectLoader::load_file(input) {
            Ok(file) => sources.push(file),
            Err(e) => warn!("{:#}", e),
        }
    }
    for folder in &cli.folder {
        sources.extend(ProjectLoader::load_folder(folder)?);
    }
    if let Some(manifest) = &cli.workspace {
        let files = ProjectLoader::load_workspace(manifest)?;
        info!("workspace collected {} .rs files", files.len());
        sources.extend(files);
    }
    Ok(sources)
}

fn write_single(output: Option<&Path>, document: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, document)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_formats {
        list_formats();
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    let mut options = config.export.clone();
    if cli.no_type_name {
        options.include_type_name = false;
    }
    if cli.resolve_types {
        options.resolve_types = true;
    }
    if let Some(ascii_format) = cli.ascii_format {
        options.ascii_format = ascii_format;
    }
    let format = cli.format.unwrap_or(config.format);

    let sources = collect_sources(&cli)?;
    if sources.is_empty() {
        bail!("Please provide at least one --input <file>, --folder <dir> or --workspace <Cargo.toml>");
    }

    let usecase = ExportUsecase {
        parser: &SynAstParser,
        resolver: &SynTypeResolver,
        format,
        options,
    };

    match (&cli.out_dir, sources.as_slice()) {
        (None, [single]) => {
            // syn and the walk both recurse per nesting level
            let pool = build_export_pool(config.worker_stack_size_mb)?;
            let exported =
                pool.install(|| usecase.run(&single.path.to_string_lossy(), &single.content))?;
            write_single(cli.output.as_deref(), &exported.document)?;
            if let Some(path) = &cli.output {
                info!(
                    "Export completed! {} nodes written to {} (format: {})",
                    exported.node_count,
                    path.display(),
                    format
                );
            }
            Ok(())
        }
        (None, _) => bail!(
            "{} source files found; use --out-dir <dir> to export more than one",
            sources.len()
        ),
        (Some(out_dir), _) => {
            if cli.output.is_some() {
                warn!("--output is ignored in batch mode");
            }
            let pool = build_export_pool(config.worker_stack_size_mb)?;
            let outcomes = pool.install(|| usecase.run_batch(&sources));
            let manifest = usecase.write_batch(&outcomes, out_dir)?;
            for entry in &manifest.files {
                if entry.error.is_none() {
                    info!("{} nodes  {}", pad_start(&entry.node_count.to_string(), 8), entry.source);
                }
            }
            info!(
                "Batch export completed! {} files written to {} ({} failed)",
                manifest.exported,
                out_dir.display(),
                manifest.failed
            );
            if manifest.exported == 0 {
                bail!("No file could be exported");
            }
            Ok(())
        }
    }
}
