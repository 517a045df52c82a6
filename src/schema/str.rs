use serde::{Deserialize, Serialize};

use super::Lengths;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    /// Required substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substr: Option<String>,
    /// Full-match pattern (anchored on both ends when checked).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl StrProps {
    pub fn with_value(mut self, v: impl Into<String>) -> Self { self.value = Some(v.into()); self }
    pub fn with_len(mut self, n: usize) -> Self { self.len = Some(n); self }
    pub fn with_min_len(mut self, n: usize) -> Self { self.min_len = Some(n); self }
    pub fn with_max_len(mut self, n: usize) -> Self { self.max_len = Some(n); self }
    pub fn with_substr(mut self, s: impl Into<String>) -> Self { self.substr = Some(s.into()); self }
    pub fn with_regex(mut self, rx: impl Into<String>) -> Self { self.regex = Some(rx.into()); self }

    pub fn lengths(&self) -> Lengths {
        Lengths { len: self.len, min_len: self.min_len, max_len: self.max_len }
    }

    pub fn with_lengths(mut self, l: Lengths) -> Self {
        self.len = l.len;
        self.min_len = l.min_len;
        self.max_len = l.max_len;
        self
    }

    /// `other`'s set fields win.
    pub fn overlay(&self, other: &Self) -> Self {
        let lengths = self.lengths().overlay(other.lengths());
        StrProps {
            value: other.value.clone().or_else(|| self.value.clone()),
            len: lengths.len,
            min_len: lengths.min_len,
            max_len: lengths.max_len,
            substr: other.substr.clone().or_else(|| self.substr.clone()),
            regex: other.regex.clone().or_else(|| self.regex.clone()),
        }
    }
}

/// Lengths are counted in chars, not bytes.
pub fn char_len(s: &str) -> usize { s.chars().count() }

/// Anchor a user pattern so it must match the whole string.
pub fn anchored(rx: &str) -> String { format!(r"\A(?:{rx})\z") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_unset_fields_of_base() {
        let base = StrProps::default().with_substr("ban").with_max_len(10);
        let got = base.overlay(&StrProps::default().with_min_len(3));
        assert_eq!(got, StrProps::default().with_substr("ban").with_min_len(3).with_max_len(10));
    }

    #[test]
    fn char_len_counts_scalars() {
        assert_eq!(char_len("näïve"), 5);
    }

    #[test]
    fn anchored_pattern_requires_full_match() {
        let rx = regex::Regex::new(&anchored("a|ab")).unwrap();
        assert!(rx.is_match("ab"));
        assert!(!rx.is_match("abc"));
    }
}
