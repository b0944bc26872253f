use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use super::counts::{CountMap, PatternCounts};
use super::patterns::PatternSet;

/// What the tree view knows about a sibling when ordering or decorating it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

/// Semantic colour of a label; resolved against the active palette when drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTone {
    Success,
    Info,
}

/// Where a label is drawn on its row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    /// Right after the name, as ` [text]`
    Inline,
    /// Right-aligned after a dotted leader
    CountColumn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLabel {
    pub text: String,
    pub tone: LabelTone,
    pub placement: LabelPlacement,
}

/// Strategy the tree view calls back into for decorations and sibling order
pub trait TreeDecorator {
    fn labels(&self, entry: &SortEntry) -> Vec<TreeLabel>;

    fn compare(&self, left: &SortEntry, right: &SortEntry) -> Ordering;
}

/// Plain listing: no labels, directories first, then name
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecorator;

impl TreeDecorator for DefaultDecorator {
    fn labels(&self, _entry: &SortEntry) -> Vec<TreeLabel> {
        Vec::new()
    }

    fn compare(&self, left: &SortEntry, right: &SortEntry) -> Ordering {
        directories_first(left, right).then_with(|| compare_names(&left.name, &right.name))
    }
}

/// Static label attached to entries by name
struct LabelRule {
    test: fn(&str, bool) -> bool,
    text: &'static str,
    tone: LabelTone,
}

const LABEL_RULES: &[LabelRule] = &[LabelRule {
    test: is_source_dir,
    text: "source",
    tone: LabelTone::Success,
}];

fn is_source_dir(name: &str, is_directory: bool) -> bool {
    is_directory && name == "src"
}

fn directories_first(left: &SortEntry, right: &SortEntry) -> Ordering {
    right.is_directory.cmp(&left.is_directory)
}

/// Case-insensitive, with the raw name as a deterministic tie-break
pub fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// Read-only view over the latest scan, used to decorate and order tree nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountIndex {
    patterns: PatternSet,
    counts: CountMap,
}

impl CountIndex {
    pub fn new(patterns: PatternSet, counts: CountMap) -> Self {
        Self { patterns, counts }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn counts(&self, path: &Path) -> Option<&PatternCounts> {
        self.counts.get(path)
    }

    pub fn count_map(&self) -> &CountMap {
        &self.counts
    }

    /// Sum over the active patterns, 0 for paths that were not scanned
    pub fn total_count(&self, path: &Path) -> u64 {
        self.counts
            .get(path)
            .map(|counts| counts.total(&self.patterns))
            .unwrap_or(0)
    }

    /// One `"<pattern>: <count>"` label per pattern with a positive count
    pub fn count_labels(&self, path: &Path) -> Vec<TreeLabel> {
        let Some(counts) = self.counts.get(path) else {
            return Vec::new();
        };
        self.patterns
            .iter()
            .filter_map(|pattern| {
                let count = counts.get(pattern);
                (count > 0).then(|| TreeLabel {
                    text: format!("{pattern}: {count}"),
                    tone: LabelTone::Info,
                    placement: LabelPlacement::CountColumn,
                })
            })
            .collect()
    }
}

impl TreeDecorator for CountIndex {
    fn labels(&self, entry: &SortEntry) -> Vec<TreeLabel> {
        let mut labels: Vec<TreeLabel> = LABEL_RULES
            .iter()
            .filter(|rule| (rule.test)(&entry.name, entry.is_directory))
            .map(|rule| TreeLabel {
                text: rule.text.to_string(),
                tone: rule.tone,
                placement: LabelPlacement::Inline,
            })
            .collect();
        labels.extend(self.count_labels(&entry.path));
        labels
    }

    /// Directories first, then higher totals, then case-insensitive name
    fn compare(&self, left: &SortEntry, right: &SortEntry) -> Ordering {
        directories_first(left, right)
            .then_with(|| {
                self.total_count(&right.path)
                    .cmp(&self.total_count(&left.path))
            })
            .then_with(|| compare_names(&left.name, &right.name))
    }
}
