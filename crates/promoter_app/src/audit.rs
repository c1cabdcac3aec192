use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use promoter_core::{compare, label_from_ledger_filename, AuditReport};
use promoter_engine::read_rows;

use crate::cli::AuditArgs;
use crate::config::PromoterConfig;
use crate::input::read_url_list;

/// Returns whether the ledger and the source agree.
pub fn run(args: AuditArgs, config: &PromoterConfig) -> Result<bool> {
    let name = args
        .ledger
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match label_from_ledger_filename(&config.ledger_prefix, &name) {
        Ok(label) => engine_info!("Auditing ledger for batch '{}'", label),
        Err(err) => engine_warn!("{}", err),
    }

    let rows = read_rows(&args.ledger)
        .with_context(|| format!("failed to read ledger {}", args.ledger.display()))?;
    let source = read_url_list(&args.urls)?;
    let report = compare(rows.iter().map(|row| row.url.as_str()), &source);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_report(&report))?);
    } else {
        print_text(&report);
    }

    Ok(report.is_consistent())
}

fn json_report(report: &AuditReport) -> serde_json::Value {
    serde_json::json!({
        "consistent": report.is_consistent(),
        "matching": report.matching,
        "only_in_source": report.only_in_source,
        "only_in_ledger": report.only_in_ledger,
    })
}

fn print_text(report: &AuditReport) {
    for key in &report.only_in_source {
        println!("missing from ledger: {key}");
    }
    for key in &report.only_in_ledger {
        println!("not in source:       {key}");
    }
    println!(
        "{} matching, {} missing from ledger, {} not in source",
        report.matching,
        report.only_in_source.len(),
        report.only_in_ledger.len()
    );
}

#[cfg(test)]
mod tests {
    use promoter_engine::LedgerWriter;

    use super::run;
    use crate::cli::AuditArgs;
    use crate::config::PromoterConfig;

    fn audit(ledger_urls: &[&str], source: &str) -> bool {
        let temp = tempfile::TempDir::new().unwrap();
        let ledger = temp.path().join("promotions_audit.csv");
        let mut writer = LedgerWriter::open(&ledger).unwrap();
        for url in ledger_urls {
            writer.append("Promo", url).unwrap();
        }
        let urls = temp.path().join("urls.txt");
        std::fs::write(&urls, source).unwrap();

        let args = AuditArgs {
            ledger,
            urls: urls.to_string_lossy().into_owned(),
            json: true,
        };
        run(args, &PromoterConfig::default()).unwrap()
    }

    #[test]
    fn matching_ledger_passes() {
        let consistent = audit(
            &["https://a.example", "https://b.example/post"],
            "http://www.a.example/\nhttps://b.example/post?utm_source=x\n",
        );
        assert!(consistent);
    }

    #[test]
    fn any_difference_fails() {
        let consistent = audit(&["https://a.example"], "https://a.example\nhttps://c.example\n");
        assert!(!consistent);
    }
}
