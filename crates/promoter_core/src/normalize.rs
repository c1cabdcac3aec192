use std::sync::LazyLock;

use regex::Regex;

static TRACKING_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&])(?:utm_[^&#=]*|fbclid|gclid|mc_[^&#=]*)=[^&#]*")
        .expect("tracking parameter pattern")
});
static SESSION_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([?&])sid=[^&#]*").expect("session parameter pattern"));
// Separators left behind once a parameter is cut out: `?&b=1` and `a=1&&b=2`.
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&])&+").expect("separator run pattern"));
static DANGLING_AMPERSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&+(#|$)").expect("dangling ampersand pattern"));
static PLAIN_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^http://").expect("plain scheme pattern"));
static WWW_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https://www\.").expect("www prefix pattern"));

/// Canonical dedupe key for a URL.
///
/// Drops tracking (`utm_*`, `fbclid`, `gclid`, `mc_*`) and `sid` query
/// parameters and the fragment, upgrades `http` to `https`, drops a leading
/// `www.`, trims a trailing `/?`, `/` and `?`, then lower-cases and trims.
/// The rules are re-applied until the key is stable, so the result is a fixed
/// point: `normalize_url(&normalize_url(x)) == normalize_url(x)`.
///
/// An empty key means the URL is unusable; see [`is_usable`].
pub fn normalize_url(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// [`normalize_url`] for values that may be absent; `None` yields an empty key.
pub fn normalize_opt(url: Option<&str>) -> String {
    url.map(normalize_url).unwrap_or_default()
}

/// Whether a normalized key can take part in dedupe and export.
pub fn is_usable(key: &str) -> bool {
    !key.is_empty()
}

fn normalize_once(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let url = strip_query_params(url, &TRACKING_PARAM);
    let url = strip_query_params(&url, &SESSION_PARAM);
    let url = match url.find('#') {
        Some(idx) => &url[..idx],
        None => url.as_str(),
    };
    let url = PLAIN_SCHEME.replace(url, "https://");
    let url = WWW_PREFIX.replace(&url, "https://");

    let mut url: &str = &url;
    if let Some(rest) = url.strip_suffix("/?") {
        url = rest;
    }
    if let Some(rest) = url.strip_suffix('/') {
        url = rest;
    }
    if let Some(rest) = url.strip_suffix('?') {
        url = rest;
    }

    url.to_lowercase().trim().to_string()
}

fn strip_query_params(url: &str, pattern: &Regex) -> String {
    let stripped = pattern.replace_all(url, "$1");
    let stripped = SEPARATOR_RUN.replace_all(&stripped, "$1");
    DANGLING_AMPERSAND.replace_all(&stripped, "$1").into_owned()
}
