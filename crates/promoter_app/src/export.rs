use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use promoter_core::format_duration;
use promoter_engine::{export_batch, CommandProcessor, ExportReport, ExportStats, HostWorkerPool};
use serde::Serialize;

use crate::cli::ExportArgs;
use crate::config::{PromoterConfig, DEFAULT_CONFIG_FILE};
use crate::input::read_url_list;

#[derive(Debug, Serialize)]
struct Summary {
    ledger: PathBuf,
    stats: ExportStats,
    elapsed: String,
    problems: Vec<Problem>,
}

#[derive(Debug, Serialize)]
struct Problem {
    url: String,
    outcome: String,
}

impl Summary {
    fn new(ledger: PathBuf, report: &ExportReport) -> Self {
        Self {
            ledger,
            stats: report.stats,
            elapsed: format_duration(report.elapsed),
            problems: report
                .results
                .iter()
                .filter(|result| !result.outcome.is_success())
                .map(|result| Problem {
                    url: result.url.clone(),
                    outcome: result.outcome.to_string(),
                })
                .collect(),
        }
    }

    fn print_text(&self) {
        for problem in &self.problems {
            println!("{}  {}", problem.outcome, problem.url);
        }
        println!(
            "Processed {} new URLs out of {} total in {} ({} rejected, {} failed, {} skipped)",
            self.stats.written,
            self.stats.total,
            self.elapsed,
            self.stats.rejected,
            self.stats.failed,
            self.stats.skipped
        );
        println!("Ledger: {}", self.ledger.display());
    }
}

pub fn run(args: ExportArgs, config: &PromoterConfig) -> Result<()> {
    if config.hosts.is_empty() {
        bail!(
            "no hosts configured; pass --host or set `hosts` in {}",
            DEFAULT_CONFIG_FILE
        );
    }
    let urls = read_url_list(&args.urls)?;
    let ledger_path = args
        .ledger
        .clone()
        .unwrap_or_else(|| config.ledger_path(&args.label()));
    engine_info!("Exporting {} URLs into {}", urls.len(), ledger_path.display());

    let processor = Arc::new(CommandProcessor::new(config.command_settings()));
    let mut pool = HostWorkerPool::new(config.hosts(), processor, config.pool_settings())?;
    pool.start()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build async runtime")?;
    let report = runtime.block_on(export_batch(&urls, &pool, &ledger_path));

    let detached = pool.shutdown();
    if detached > 0 {
        engine_warn!("{} host workers were still busy at exit", detached);
    }
    let report =
        report.with_context(|| format!("export into {} aborted", ledger_path.display()))?;

    let summary = Summary::new(ledger_path, &report);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_text();
    }
    Ok(())
}
