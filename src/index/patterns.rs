use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMMENT_PATTERNS, MAX_COMMENT_PATTERNS};
use crate::utils::PatternError;

/// Ordered, de-duplicated list of literal markers to count.
///
/// Order only matters for display; every pattern is counted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternSet(Vec<String>);

impl PatternSet {
    /// Validate an already split list of markers
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique = normalize(patterns);
        if unique.is_empty() {
            return Err(PatternError::Empty);
        }
        if unique.len() > MAX_COMMENT_PATTERNS {
            return Err(PatternError::too_many());
        }
        Ok(Self(unique))
    }

    /// Parse user input separated by commas and/or newlines
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        Self::new(raw.split([',', '\n']))
    }

    /// Rebuild a set from a persisted value, clamping instead of rejecting.
    ///
    /// Falls back to the default markers when nothing usable is left.
    pub fn from_stored<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique = normalize(patterns);
        unique.truncate(MAX_COMMENT_PATTERNS);
        if unique.is_empty() {
            return Self::defaults();
        }
        Self(unique)
    }

    pub fn defaults() -> Self {
        Self(
            DEFAULT_COMMENT_PATTERNS
                .iter()
                .take(MAX_COMMENT_PATTERNS)
                .map(|p| p.to_string())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joined form used in the status bar and as the editor's initial text
    pub fn display(&self) -> String {
        self.0.join(", ")
    }
}

/// Trim, drop empties and drop duplicates while keeping first occurrences
pub fn normalize<I, S>(patterns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for pattern in patterns {
        let trimmed = pattern.as_ref().trim();
        if trimmed.is_empty() || unique.iter().any(|p| p == trimmed) {
            continue;
        }
        unique.push(trimmed.to_string());
    }
    unique
}

/// Count non-overlapping literal occurrences of `pattern` in `content`
pub fn count_matches(content: &str, pattern: &str) -> u64 {
    if pattern.is_empty() {
        return 0;
    }
    content.matches(pattern).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_trims_and_dedups() {
        let set = PatternSet::parse(" TODO: ,@ts-ignore\nTODO:,, ").unwrap();
        assert_eq!(set.as_slice(), &["TODO:".to_string(), "@ts-ignore".to_string()]);
        assert_eq!(set.display(), "TODO:, @ts-ignore");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PatternSet::parse(""), Err(PatternError::Empty));
        assert_eq!(PatternSet::parse("  ,\n , "), Err(PatternError::Empty));
    }

    #[test]
    fn test_parse_rejects_more_than_four() {
        let err = PatternSet::parse("a, b, c, d, e").unwrap_err();
        assert_eq!(err.to_string(), "Max 4 markers.");

        // Duplicates do not count towards the limit
        let set = PatternSet::parse("a, b, c, d, a").unwrap();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_from_stored_clamps_and_falls_back() {
        let stored = vec!["a", "b", " c ", "d", "e"];
        assert_eq!(PatternSet::from_stored(stored).as_slice().len(), 4);

        let empty: Vec<String> = vec!["  ".to_string()];
        assert_eq!(PatternSet::from_stored(empty), PatternSet::defaults());
    }

    #[test]
    fn test_count_matches_is_literal() {
        assert_eq!(count_matches("a.b a.b axb", "a.b"), 2);
        assert_eq!(count_matches("(x)(x)", "(x)"), 2);
        assert_eq!(count_matches("[ts] [ts]", "[ts]"), 2);
        assert_eq!(count_matches("abc", ".*"), 0);
    }

    #[test]
    fn test_count_matches_is_non_overlapping() {
        assert_eq!(count_matches("aaaa", "aa"), 2);
        assert_eq!(count_matches("", "TODO:"), 0);
        assert_eq!(count_matches("TODO:", ""), 0);
    }
}
