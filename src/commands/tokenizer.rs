//! Command text tokenizing

/// Split command text into non-empty tokens
///
/// Tabs, newlines, carriage returns, NULs and vertical tabs count as spaces.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split([' ', '\t', '\n', '\r', '\0', '\x0B'])
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Lower-cased first token, if any
pub fn action_name(tokens: &[String]) -> Option<String> {
    tokens.first().map(|t| t.to_lowercase())
}

/// Milliseconds from a `0x` hex or decimal token; anything else is 0
pub fn parse_millis(token: &str) -> u64 {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        if hex.starts_with('+') {
            return 0;
        }
        return u64::from_str_radix(hex, 16).unwrap_or(0);
    }

    if !token.starts_with(|c: char| c.is_ascii_digit()) {
        return 0;
    }
    token.parse().unwrap_or(0)
}
