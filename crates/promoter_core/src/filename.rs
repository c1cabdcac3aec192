use thiserror::Error;

const LEDGER_EXTENSION: &str = ".csv";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerNameError {
    #[error("ledger file name must look like '{prefix}<label>.csv', got '{name}'")]
    Malformed { prefix: String, name: String },
}

/// Deterministic ledger file name for a batch label: `{prefix}{label}.csv`.
///
/// Every character that is not alphanumeric or `_` becomes `_`, runs of `_`
/// collapse, and leading/trailing `_` are dropped.
pub fn ledger_filename(prefix: &str, label: &str) -> String {
    format!("{prefix}{}{LEDGER_EXTENSION}", sanitize_label(label))
}

/// Recover the batch label from a ledger file name produced by [`ledger_filename`].
pub fn label_from_ledger_filename(prefix: &str, name: &str) -> Result<String, LedgerNameError> {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(LEDGER_EXTENSION))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LedgerNameError::Malformed {
            prefix: prefix.to_string(),
            name: name.to_string(),
        })
}

fn sanitize_label(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if c.is_alphanumeric() || c == '_' { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let trimmed = compacted.trim_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{label_from_ledger_filename, ledger_filename, LedgerNameError};

    #[test]
    fn label_is_made_file_safe() {
        assert_eq!(
            ledger_filename("promotions_", "Gaza: Saved Search!"),
            "promotions_Gaza_Saved_Search.csv"
        );
        assert_eq!(ledger_filename("promotions_", "///"), "promotions_untitled.csv");
    }

    #[test]
    fn label_round_trips_through_filename() {
        let name = ledger_filename("promotions_", "tech_news");
        assert_eq!(
            label_from_ledger_filename("promotions_", &name).unwrap(),
            "tech_news"
        );
    }

    #[test]
    fn foreign_file_names_are_refused() {
        assert_eq!(
            label_from_ledger_filename("promotions_", "notes.txt"),
            Err(LedgerNameError::Malformed {
                prefix: "promotions_".to_string(),
                name: "notes.txt".to_string(),
            })
        );
        assert!(label_from_ledger_filename("promotions_", "promotions_.csv").is_err());
    }
}
