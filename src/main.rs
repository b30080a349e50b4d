use aastable::config::ExportConfig;
use aastable::export::{Exporter, collect_inputs};
use aastable::generator::TableFormat;
use aastable::model::HierarchyMode;
use anyhow::{Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Export AAS submodels as flat tables (DOCX, XLSX or JSON)", long_about = None)]
struct Cli {
    /// .aasx, .xml or .json files, or directories containing them
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<Utf8PathBuf>,

    /// Directory for the exported tables (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<Utf8PathBuf>,

    /// Output format: docx, xlsx or json
    #[arg(short, long)]
    format: Option<TableFormat>,

    /// Attribute columns in output order, e.g. id_short,value,definition
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Submodels to export: all, etc, or names such as technical_data
    #[arg(long, value_delimiter = ',')]
    submodels: Vec<String>,

    /// Fold group rows into header labels instead of one row per group
    #[arg(long)]
    collapsed: bool,

    /// Show abbreviated model types (Prop, SMC, MLP, ...)
    #[arg(long)]
    simple_model_type: bool,

    /// Omit the SMC ancestor columns
    #[arg(long)]
    no_hierarchy: bool,

    /// Attach a concept description to every matching row, not only the first
    #[arg(long)]
    shared_definitions: bool,

    /// JSON settings file; command line flags take precedence
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn export_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if !self.columns.is_empty() {
            config.extract.columns = self.columns.clone();
        }
        if !self.submodels.is_empty() {
            config.extract.submodels = self.submodels.clone();
        }
        if self.collapsed {
            config.extract.mode = HierarchyMode::Collapsed;
        }
        if self.simple_model_type {
            config.extract.simple_model_type = true;
        }
        if self.no_hierarchy {
            config.extract.hierarchy = false;
        }
        if self.shared_definitions {
            config.extract.definitions = aastable::extract::DefinitionPolicy::Shared;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.export_config()?;
    let files = collect_inputs(&cli.inputs);
    if files.is_empty() {
        bail!("No .aasx, .xml or .json input found");
    }

    let exporter = Exporter::new(config);
    let summary = exporter.run(&files);
    info!(
        "{} of {} files exported ({} tables written, {} failed)",
        summary.succeeded,
        summary.total(),
        summary.tables_written,
        summary.tables_failed
    );
    if summary.succeeded == 0 && summary.failed > 0 {
        bail!("All {} input files failed", summary.failed);
    }
    Ok(())
}
