//! `promoter`: turn URL lists into promotion lines across a set of hosts.

mod audit;
mod cli;
mod config;
mod export;
mod input;
mod logging;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::PromoterConfig;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = PromoterConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    logging::initialize(config.log_destination, config.level_filter()?);

    match cli.command {
        Commands::Export(args) => {
            export::run(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Audit(args) => Ok(if audit::run(args, &config)? {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }),
    }
}
