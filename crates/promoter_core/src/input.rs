/// Split a URL list into trimmed, non-empty lines.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_url_list;

    #[test]
    fn trims_and_ignores_empty() {
        let input = "https://a.example.com \n\n  https://b.example.com\n   \n";
        assert_eq!(
            parse_url_list(input),
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string()
            ]
        );
    }
}
