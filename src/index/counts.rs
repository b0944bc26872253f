use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::patterns::PatternSet;

/// Occurrence count per pattern; missing entries read as zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternCounts(BTreeMap<String, u64>);

/// Every visited path (files, directories and the root) to its counts
pub type CountMap = HashMap<PathBuf, PatternCounts>;

impl PatternCounts {
    /// One zero entry per pattern in the set
    pub fn zeroed(patterns: &PatternSet) -> Self {
        Self(patterns.iter().map(|p| (p.to_string(), 0)).collect())
    }

    pub fn get(&self, pattern: &str) -> u64 {
        self.0.get(pattern).copied().unwrap_or(0)
    }

    pub fn set(&mut self, pattern: impl Into<String>, count: u64) {
        self.0.insert(pattern.into(), count);
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains_key(pattern)
    }

    /// True when every pattern of the set has a recorded count
    pub fn covers(&self, patterns: &PatternSet) -> bool {
        patterns.iter().all(|p| self.contains(p))
    }

    /// Project onto exactly the patterns of `patterns`, zero-filling gaps
    pub fn select(&self, patterns: &PatternSet) -> Self {
        Self(
            patterns
                .iter()
                .map(|p| (p.to_string(), self.get(p)))
                .collect(),
        )
    }

    /// Pattern-wise addition restricted to the set
    pub fn accumulate(&mut self, other: &PatternCounts, patterns: &PatternSet) {
        for pattern in patterns.iter() {
            let sum = self.get(pattern) + other.get(pattern);
            self.set(pattern, sum);
        }
    }

    pub fn total(&self, patterns: &PatternSet) -> u64 {
        patterns.iter().map(|p| self.get(p)).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for PatternCounts {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
