const SHORT_URL_CHARS: usize = 22;

/// Drops the scheme and keeps the first few characters, marking the cut with
/// an ellipsis.
pub fn short_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    let mut chars = without_scheme.chars();
    let mut short = chars.by_ref().take(SHORT_URL_CHARS).collect::<String>();
    if chars.next().is_some() {
        short.push('…');
    }
    short
}

#[cfg(test)]
mod tests {
    use super::short_url;

    #[test]
    fn strips_scheme_and_truncates() {
        assert_eq!(short_url("https://api.example.com/v1"), "api.example.com/v1");
        assert_eq!(short_url("http://x.io"), "x.io");
        assert_eq!(
            short_url("https://api.example.com/v1/users/{id}/orders"),
            "api.example.com/v1/use…"
        );
        assert_eq!(short_url("/relative/path"), "/relative/path");
        assert_eq!(short_url("  "), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        let long = "é".repeat(23);
        assert_eq!(short_url(&long), format!("{}…", "é".repeat(22)));
        assert_eq!(short_url(&"é".repeat(22)), "é".repeat(22));
    }
}
