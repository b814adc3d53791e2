/// Collapse whitespace runs (including newlines and nbsp) into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut prev_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_was_space && !cleaned.is_empty() {
                cleaned.push(' ');
                prev_was_space = true;
            }
        } else {
            cleaned.push(c);
            prev_was_space = false;
        }
    }
    cleaned.trim_end().to_string()
}

/// Text content as an optional cell value: empty text is a missing value
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Kylian\n   Mbappé  "), "Kylian Mbappé");
        assert_eq!(normalize_whitespace("a\u{a0}\u{a0}b"), "a b");
        assert_eq!(normalize_whitespace("\t\n"), "");
    }
}
