//! Ordered hash-token sequence describing an output and its inputs.

use std::fmt;

/// Separator between tokens in the rendered sidecar text.
pub const SEPARATOR: &str = "\n";

/// Token recorded for an optional input that has no value.
pub const ABSENT_TOKEN: &str = "null";

/// Output-content tokens first, then tracked-input tokens in declared order.
///
/// Equal fingerprints mean no byte-level change was observed; token order is
/// part of the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    tokens: Vec<String>,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    pub fn push_absent(&mut self) {
        self.tokens.push(ABSENT_TOKEN.to_string());
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Sidecar text: tokens joined by [`SEPARATOR`], no trailing separator.
    pub fn render(&self) -> String {
        self.tokens.join(SEPARATOR)
    }

    /// True when `stored` is exactly the rendered form of this fingerprint.
    pub fn matches(&self, stored: &str) -> bool {
        self.render() == stored
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<S: Into<String>> Extend<S> for Fingerprint {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tokens.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut fingerprint = Self::new();
        fingerprint.extend(iter);
        fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_newline_joined_without_trailing_separator() {
        let fp: Fingerprint = ["aa", "bb", ABSENT_TOKEN].into_iter().collect();
        assert_eq!(fp.render(), "aa\nbb\nnull");
    }

    #[test]
    fn matches_only_exact_rendering() {
        let fp: Fingerprint = ["aa", "bb"].into_iter().collect();
        assert!(fp.matches("aa\nbb"));
        assert!(!fp.matches("bb\naa"));
        assert!(!fp.matches("aa\nbb\n"));
        assert!(!fp.matches("aa"));
        assert!(!fp.matches("aa\nbb\ncc"));
    }

    #[test]
    fn empty_fingerprint_matches_empty_text_only() {
        let fp = Fingerprint::new();
        assert!(fp.matches(""));
        assert!(!fp.matches("aa"));
    }
}
