use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ansi escape pattern")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace run pattern"));

/// Reduce arbitrary text to a single line of printable ASCII.
///
/// Terminal escape sequences are dropped, the text is NFKD-decomposed so
/// accented letters keep their base letter, every remaining non-ASCII and
/// control character is removed, `"` becomes `'`, and whitespace runs collapse
/// to one space. The result can sit inside a quoted CSV field as-is.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = ANSI_ESCAPE.replace_all(text, "");
    let ascii: String = text
        .nfkd()
        .filter(char::is_ascii)
        .filter(|c| !c.is_ascii_control())
        .map(|c| if c == '"' { '\'' } else { c })
        .collect();
    WHITESPACE_RUN.replace_all(ascii.trim(), " ").into_owned()
}
