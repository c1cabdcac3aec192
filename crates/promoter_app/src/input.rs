use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use promoter_core::parse_url_list;

/// Read a URL list from a file, or from stdin when `source` is `-`.
pub fn read_url_list(source: &str) -> Result<Vec<String>> {
    let raw = if source == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read URLs from stdin")?;
        raw
    } else {
        fs::read_to_string(Path::new(source))
            .with_context(|| format!("failed to read URL list {source}"))?
    };
    Ok(parse_url_list(&raw))
}
