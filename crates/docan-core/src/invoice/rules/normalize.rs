//! Whitespace normalization for matched text fragments.

/// Collapse every whitespace run into a single space and trim the ends.
///
/// Only applied to matched fragments; header rules run on the original text
/// because they rely on its line breaks.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Widget   \tAssembly"), "Widget Assembly");
        assert_eq!(collapse_whitespace("  a\n\nb \r\n c  "), "a b c");
        assert_eq!(collapse_whitespace("single"), "single");
    }

    #[test]
    fn test_collapse_whitespace_empty() {
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \t\n "), "");
    }
}
