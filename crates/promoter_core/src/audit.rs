use std::collections::BTreeSet;

use crate::normalize::{is_usable, normalize_url};

/// Set difference between a ledger and an independent list of URLs,
/// compared by normalized key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Keys present in the source but never recorded in the ledger.
    pub only_in_source: Vec<String>,
    /// Keys recorded in the ledger that the source does not know about.
    pub only_in_ledger: Vec<String>,
    pub matching: usize,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.only_in_source.is_empty() && self.only_in_ledger.is_empty()
    }
}

/// Compare ledger URLs against source URLs. Unusable URLs on either side are ignored.
pub fn compare<L, S, A, B>(ledger_urls: L, source_urls: S) -> AuditReport
where
    L: IntoIterator<Item = A>,
    S: IntoIterator<Item = B>,
    A: AsRef<str>,
    B: AsRef<str>,
{
    let ledger = key_set(ledger_urls);
    let source = key_set(source_urls);

    AuditReport {
        only_in_source: source.difference(&ledger).cloned().collect(),
        only_in_ledger: ledger.difference(&source).cloned().collect(),
        matching: ledger.intersection(&source).count(),
    }
}

fn key_set<I, T>(urls: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    urls.into_iter()
        .map(|url| normalize_url(url.as_ref()))
        .filter(|key| is_usable(key))
        .collect()
}
