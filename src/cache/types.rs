use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::index::{FileStat, PatternCounts};

/// Per-file memo used to skip re-reading and re-counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCacheEntry {
    /// Hex SHA-256 of the raw file bytes
    pub hash: String,
    pub size: u64,
    pub modified: SystemTime,
    /// Counts for every pattern ever computed against this content
    pub pattern_counts: PatternCounts,
}

impl FileCacheEntry {
    /// Size and mtime both match the current stat
    pub fn matches_stat(&self, stat: &FileStat) -> bool {
        self.size == stat.size && self.modified == stat.modified
    }
}

/// Absolute file path to its cache entry, scoped to one scanned root
pub type RootFileCache = HashMap<PathBuf, FileCacheEntry>;

/// How a single file's counts were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOutcome {
    /// Path is no longer a regular file
    NotAFile,
    /// Size and mtime matched and all patterns were known; nothing was read
    Fresh,
    /// Content hash matched; only unknown patterns were counted
    HashMatch,
    /// Content changed; all requested patterns recounted
    Recomputed,
    /// First time this path was seen
    New,
    /// Reading failed; the previous entry was reused
    Stale,
    /// Reading failed and nothing was cached
    Failed,
}

impl CountOutcome {
    pub fn read_content(&self) -> bool {
        matches!(self, Self::HashMatch | Self::Recomputed | Self::New)
    }
}

/// Counters for one indexing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub directories: usize,
    pub unreadable_directories: usize,
    pub files: usize,
    pub fresh: usize,
    pub hash_matches: usize,
    pub recomputed: usize,
    pub new_entries: usize,
    pub stale: usize,
    pub failed: usize,
    pub bytes_read: u64,
}

impl ScanStats {
    pub fn record(&mut self, outcome: CountOutcome) {
        self.files += 1;
        match outcome {
            CountOutcome::NotAFile | CountOutcome::Failed => self.failed += 1,
            CountOutcome::Fresh => self.fresh += 1,
            CountOutcome::HashMatch => self.hash_matches += 1,
            CountOutcome::Recomputed => self.recomputed += 1,
            CountOutcome::New => self.new_entries += 1,
            CountOutcome::Stale => self.stale += 1,
        }
    }

    /// Files whose content had to be read
    pub fn files_read(&self) -> usize {
        self.hash_matches + self.recomputed + self.new_entries
    }

    pub fn merge(&mut self, other: &ScanStats) {
        self.directories += other.directories;
        self.unreadable_directories += other.unreadable_directories;
        self.files += other.files;
        self.fresh += other.fresh;
        self.hash_matches += other.hash_matches;
        self.recomputed += other.recomputed;
        self.new_entries += other.new_entries;
        self.stale += other.stale;
        self.failed += other.failed;
        self.bytes_read += other.bytes_read;
    }
}
