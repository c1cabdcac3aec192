use std::collections::HashSet;

use crate::normalize::{is_usable, normalize_url};
use crate::sanitize::sanitize;

/// A candidate URL that still needs a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    pub url: String,
    /// Dedupe key of the URL as submitted.
    pub key: String,
    /// Key of the URL as it would be written, `normalize(sanitize(url))`.
    /// This is what a restart reads back; empty if nothing printable is left.
    pub row_key: String,
}

impl PendingUrl {
    fn keys(&self) -> impl Iterator<Item = &str> {
        [self.key.as_str(), self.row_key.as_str()]
            .into_iter()
            .filter(|key| is_usable(key))
    }
}

/// Normalized keys of every URL already handled.
///
/// Rebuilt from the persisted rows at startup; during a batch it also absorbs
/// rejected and failed URLs, which are not written anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    keys: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from raw URLs; unusable ones are skipped.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Self::new();
        for url in urls {
            ledger.mark(normalize_url(url.as_ref()));
        }
        ledger
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Record a key. Returns `false` if it was already present or is unusable.
    pub fn mark(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if !is_usable(&key) {
            return false;
        }
        self.keys.insert(key)
    }

    /// Record both keys of a handled URL, so neither spelling comes back.
    pub fn record(&mut self, pending: &PendingUrl) {
        for key in pending.keys() {
            self.mark(key);
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// URLs from `urls` that are neither recorded nor repeated earlier in the
    /// same batch, in input order. Unusable URLs are dropped silently.
    ///
    /// A URL counts as recorded when either its own key or the key of its
    /// sanitized form is known: the file only holds sanitized URLs.
    pub fn pending<'a, I>(&self, urls: I) -> Vec<PendingUrl>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        urls.into_iter()
            .filter_map(|url| {
                let key = normalize_url(url);
                if !is_usable(&key) {
                    return None;
                }
                let pending = PendingUrl {
                    url: url.clone(),
                    row_key: normalize_url(&sanitize(url)),
                    key,
                };
                if pending
                    .keys()
                    .any(|key| self.contains_key(key) || seen.contains(key))
                {
                    return None;
                }
                seen.extend(pending.keys().map(str::to_string));
                Some(pending)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::normalize::normalize_url;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_unrecorded_urls_are_pending() {
        let ledger = Ledger::from_urls(["https://a.example", "https://b.example"]);
        let batch = vec![
            "https://a.example".to_string(),
            "http://www.b.example/".to_string(),
            "https://c.example".to_string(),
        ];

        let pending = ledger.pending(&batch);
        let urls: Vec<_> = pending.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://c.example"]);
        assert_eq!(pending[0].key, "https://c.example");
    }

    #[test]
    fn batch_duplicates_and_blank_urls_are_dropped() {
        let batch = vec![
            "https://a.example/x".to_string(),
            "  ".to_string(),
            "HTTPS://A.EXAMPLE/x/".to_string(),
        ];
        let pending = Ledger::new().pending(&batch);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, "https://a.example/x");
    }

    #[test]
    fn mark_ignores_empty_and_repeats() {
        let mut ledger = Ledger::new();
        assert!(ledger.mark("https://a.example"));
        assert!(!ledger.mark("https://a.example"));
        assert!(!ledger.mark(""));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains_key(&normalize_url("http://www.a.example/")));
    }

    #[test]
    fn sanitized_spelling_counts_as_recorded() {
        // The file holds `/cafe` for a URL submitted as `/café`.
        let ledger = Ledger::from_urls(["https://blog.example/cafe"]);
        let batch = vec![
            "https://blog.example/caf\u{e9}".to_string(),
            "https://blog.example/say\"hi\"".to_string(),
        ];
        let pending = ledger.pending(&batch);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].row_key, "https://blog.example/say'hi'");
    }

    #[test]
    fn spellings_that_write_the_same_row_are_dispatched_once() {
        let batch = vec![
            "https://blog.example/caf\u{e9}".to_string(),
            "https://blog.example/cafe".to_string(),
            "https://blog.example/a\tb".to_string(),
            "https://blog.example/ab".to_string(),
        ];
        let pending = Ledger::new().pending(&batch);
        let urls: Vec<_> = pending.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://blog.example/caf\u{e9}", "https://blog.example/a\tb"]
        );
    }

    #[test]
    fn record_marks_both_spellings() {
        let batch = vec!["https://blog.example/caf\u{e9}".to_string()];
        let mut ledger = Ledger::new();
        let pending = ledger.pending(&batch);
        ledger.record(&pending[0]);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains_key("https://blog.example/cafe"));
        assert!(ledger.contains_key("https://blog.example/caf\u{e9}"));
    }
}
