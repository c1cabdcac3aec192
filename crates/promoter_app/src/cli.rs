use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::PromoterConfig;
use crate::logging::LogDestination;

/// Turn a list of URLs into promotion lines, spread across a set of hosts.
#[derive(Debug, Parser)]
#[command(name = "promoter", version, about, long_about = None)]
pub struct Cli {
    /// RON config file. Defaults to ./promoter.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, global = true, value_enum)]
    pub log: Option<LogDestination>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dispatch unrecorded URLs and append their promotions to the ledger.
    Export(ExportArgs),
    /// Compare a ledger against a URL list. Exits with 1 on any difference.
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// URL list, one per line. `-` reads stdin.
    pub urls: String,

    /// Host to run on. Repeat or separate with commas.
    #[arg(long = "host", value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Batch label used to name the ledger file. Defaults to the URL file's stem.
    #[arg(long)]
    pub label: Option<String>,

    /// Ledger file to use instead of the one derived from the label.
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Program run as `<program> [args...] <host> <url>`.
    #[arg(long)]
    pub command: Option<PathBuf>,

    /// Argument for the program, placed before the host. Repeatable.
    #[arg(long = "command-arg", allow_hyphen_values = true)]
    pub command_args: Vec<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Ledger CSV file.
    pub ledger: PathBuf,

    /// Source URL list, one per line. `-` reads stdin.
    pub urls: String,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Fold the global flags into `config`.
    pub fn apply_to(&self, config: &mut PromoterConfig) {
        if let Some(destination) = self.log {
            config.log_destination = destination;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Commands::Export(args) = &self.command {
            args.apply_to(config);
        }
    }
}

impl ExportArgs {
    fn apply_to(&self, config: &mut PromoterConfig) {
        if !self.hosts.is_empty() {
            config.hosts = self.hosts.clone();
        }
        if let Some(program) = &self.command {
            config.command.program = program.clone();
        }
        if !self.command_args.is_empty() {
            config.command.args = self.command_args.clone();
        }
    }

    /// Label from `--label`, else the URL file's stem, else `stdin`.
    pub fn label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        if self.urls == "-" {
            return "stdin".to_string();
        }
        PathBuf::from(&self.urls)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stdin".to_string())
    }
}
