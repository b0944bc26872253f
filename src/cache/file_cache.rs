use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

use super::types::{CountOutcome, FileCacheEntry};
use crate::index::{count_matches, FileSystem, PatternCounts, PatternSet};

/// Counts for one file plus the cache entry to carry into the next generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCountResult {
    /// Exactly one entry per requested pattern
    pub counts: PatternCounts,
    pub entry: Option<FileCacheEntry>,
    pub outcome: CountOutcome,
    pub bytes_read: u64,
}

/// Compute SHA256 hash of raw file content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Count `patterns` in the file at `path`, reusing `cached` as far as it stays valid.
///
/// Checks run cheapest first: stat, then size+mtime, then content hash.
/// Never fails; read errors fall back to the cached counts when there are any.
pub fn count_file<F>(
    fs: &F,
    path: &Path,
    patterns: &PatternSet,
    cached: Option<&FileCacheEntry>,
) -> FileCountResult
where
    F: FileSystem + ?Sized,
{
    let stat = match fs.stat(path) {
        Ok(stat) => stat,
        Err(e) => {
            debug!("stat failed for {}: {}", path.display(), e);
            return fallback(patterns, cached);
        }
    };

    if !stat.is_file {
        return FileCountResult {
            counts: PatternCounts::zeroed(patterns),
            entry: None,
            outcome: CountOutcome::NotAFile,
            bytes_read: 0,
        };
    }

    if let Some(entry) = cached {
        if entry.matches_stat(&stat) && entry.pattern_counts.covers(patterns) {
            return FileCountResult {
                counts: entry.pattern_counts.select(patterns),
                entry: Some(entry.clone()),
                outcome: CountOutcome::Fresh,
                bytes_read: 0,
            };
        }
    }

    let bytes = match fs.read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("read failed for {}: {}", path.display(), e);
            return fallback(patterns, cached);
        }
    };
    let bytes_read = bytes.len() as u64;
    let hash = hash_content(&bytes);
    let content = String::from_utf8_lossy(&bytes);

    if let Some(entry) = cached.filter(|entry| entry.hash == hash) {
        // Same content: keep every known count and only fill in new patterns
        let mut pattern_counts = entry.pattern_counts.clone();
        let mut changed = !entry.matches_stat(&stat);
        for pattern in patterns.iter() {
            if pattern_counts.contains(pattern) {
                continue;
            }
            pattern_counts.set(pattern, count_matches(&content, pattern));
            changed = true;
        }

        let next_entry = if changed {
            FileCacheEntry {
                hash,
                size: stat.size,
                modified: stat.modified,
                pattern_counts,
            }
        } else {
            entry.clone()
        };

        return FileCountResult {
            counts: next_entry.pattern_counts.select(patterns),
            entry: Some(next_entry),
            outcome: CountOutcome::HashMatch,
            bytes_read,
        };
    }

    // New or edited content: counts for patterns outside this query are dropped
    let pattern_counts: PatternCounts = patterns
        .iter()
        .map(|pattern| (pattern, count_matches(&content, pattern)))
        .collect();

    FileCountResult {
        counts: pattern_counts.select(patterns),
        entry: Some(FileCacheEntry {
            hash,
            size: stat.size,
            modified: stat.modified,
            pattern_counts,
        }),
        outcome: if cached.is_some() {
            CountOutcome::Recomputed
        } else {
            CountOutcome::New
        },
        bytes_read,
    }
}

/// Stale-but-available counts beat a zero flash
fn fallback(patterns: &PatternSet, cached: Option<&FileCacheEntry>) -> FileCountResult {
    match cached {
        Some(entry) => FileCountResult {
            counts: entry.pattern_counts.select(patterns),
            entry: Some(entry.clone()),
            outcome: CountOutcome::Stale,
            bytes_read: 0,
        },
        None => FileCountResult {
            counts: PatternCounts::zeroed(patterns),
            entry: None,
            outcome: CountOutcome::Failed,
            bytes_read: 0,
        },
    }
}
