use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::types::{RootFileCache, ScanStats};
use crate::index::{CountIndex, FileSystem, Indexer, OsFileSystem, PatternSet, ScanOptions};

/// Session-lifetime owner of the per-root file caches.
///
/// Scans are memoized on (root, patterns); each scan replaces the root's cache
/// wholesale with the generation the indexer returns.
#[derive(Debug)]
pub struct CacheManager<F: FileSystem = OsFileSystem> {
    fs: F,
    options: ScanOptions,
    roots: HashMap<PathBuf, RootFileCache>,
    last_scan: Option<ScanMemo>,
    totals: ScanStats,
    scans: usize,
    memo_hits: usize,
}

/// Inputs and result of the most recent scan
#[derive(Debug)]
struct ScanMemo {
    root: PathBuf,
    patterns: PatternSet,
    index: Arc<CountIndex>,
    stats: ScanStats,
}

impl CacheManager<OsFileSystem> {
    /// Create a new cache manager over the real filesystem
    pub fn new(options: ScanOptions) -> Self {
        Self::with_fs(OsFileSystem, options)
    }
}

impl<F: FileSystem> CacheManager<F> {
    pub fn with_fs(fs: F, options: ScanOptions) -> Self {
        Self {
            fs,
            options,
            roots: HashMap::new(),
            last_scan: None,
            totals: ScanStats::default(),
            scans: 0,
            memo_hits: 0,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Count index for `root`, rescanning only when the inputs changed
    pub fn index(&mut self, root: &Path, patterns: &PatternSet) -> Arc<CountIndex> {
        if let Some(memo) = &self.last_scan {
            if memo.root == root && memo.patterns == *patterns {
                self.memo_hits += 1;
                return Arc::clone(&memo.index);
            }
        }

        let empty = RootFileCache::new();
        let previous = self.roots.get(root).unwrap_or(&empty);
        let output = Indexer::new(&self.fs, &self.options).index(root, patterns, previous);

        self.scans += 1;
        self.totals.merge(&output.stats);
        debug!(
            "Scan #{} of {} read {} files ({} bytes)",
            self.scans,
            root.display(),
            output.stats.files_read(),
            output.stats.bytes_read
        );

        self.roots.insert(root.to_path_buf(), output.next_cache);
        let index = Arc::new(CountIndex::new(patterns.clone(), output.count_map));
        self.last_scan = Some(ScanMemo {
            root: root.to_path_buf(),
            patterns: patterns.clone(),
            index: Arc::clone(&index),
            stats: output.stats,
        });
        index
    }

    /// Force the next `index` call to rescan; file caches are kept
    pub fn invalidate(&mut self) {
        self.last_scan = None;
    }

    /// Drop every cached root and the memo
    pub fn clear_all(&mut self) {
        self.roots.clear();
        self.last_scan = None;
    }

    pub fn root_cache(&self, root: &Path) -> Option<&RootFileCache> {
        self.roots.get(root)
    }

    pub fn last_stats(&self) -> Option<ScanStats> {
        self.last_scan.as_ref().map(|memo| memo.stats)
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            roots: self.roots.len(),
            cached_files: self.roots.values().map(|cache| cache.len()).sum(),
            scans: self.scans,
            memo_hits: self.memo_hits,
            totals: self.totals,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub roots: usize,
    pub cached_files: usize,
    pub scans: usize,
    pub memo_hits: usize,
    pub totals: ScanStats,
}

impl CacheStats {
    /// Share of visited files served without reading content
    pub fn hit_rate(&self) -> f32 {
        if self.totals.files == 0 {
            return 0.0;
        }
        self.totals.fresh as f32 / self.totals.files as f32 * 100.0
    }

    /// Format cache stats for display
    pub fn format(&self) -> String {
        format!(
            "Cache: {} files in {} roots | {} scans, {} reused | {:.1}% unread",
            self.cached_files,
            self.roots,
            self.scans,
            self.memo_hits,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::testing::{write_file, CountingFs};
    use std::fs;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> PatternSet {
        PatternSet::new(list.iter().copied()).unwrap()
    }

    #[test]
    fn test_identical_inputs_reuse_previous_result() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.ts", "TODO:");
        let mut manager = CacheManager::with_fs(CountingFs::default(), ScanOptions::default());

        let first = manager.index(temp_dir.path(), &patterns(&["TODO:"]));
        let second = manager.index(temp_dir.path(), &patterns(&["TODO:"]));

        assert!(Arc::ptr_eq(&first, &second));
        let stats = manager.get_stats();
        assert_eq!(stats.scans, 1);
        assert_eq!(stats.memo_hits, 1);
        assert_eq!(manager.fs().reads(), 1);
    }

    #[test]
    fn test_pattern_change_rescans_with_cached_entries() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_file(temp_dir.path(), "a.ts", "A B");
        let mut manager = CacheManager::with_fs(CountingFs::default(), ScanOptions::default());

        manager.index(temp_dir.path(), &patterns(&["A"]));
        let index = manager.index(temp_dir.path(), &patterns(&["A", "B"]));

        assert_eq!(index.total_count(temp_dir.path()), 2);
        assert_eq!(manager.last_stats().unwrap().hash_matches, 1);
        let entry = &manager.root_cache(temp_dir.path()).unwrap()[&file];
        assert!(entry.pattern_counts.contains("A"));
        assert!(entry.pattern_counts.contains("B"));
    }

    #[test]
    fn test_previous_snapshot_is_untouched_by_rescan() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_file(temp_dir.path(), "a.ts", "TODO:");
        let mut manager = CacheManager::new(ScanOptions::default());

        let before = manager.index(temp_dir.path(), &patterns(&["TODO:"]));
        fs::write(&file, "TODO: TODO: TODO: and more").unwrap();
        manager.invalidate();
        let after = manager.index(temp_dir.path(), &patterns(&["TODO:"]));

        assert_eq!(before.total_count(&file), 1);
        assert_eq!(after.total_count(&file), 3);
    }

    #[test]
    fn test_roots_are_cached_separately() {
        let first_root = TempDir::new().unwrap();
        let second_root = TempDir::new().unwrap();
        write_file(first_root.path(), "a.ts", "X");
        write_file(second_root.path(), "b.ts", "X X");
        let mut manager = CacheManager::with_fs(CountingFs::default(), ScanOptions::default());

        manager.index(first_root.path(), &patterns(&["X"]));
        manager.index(second_root.path(), &patterns(&["X"]));
        let index = manager.index(first_root.path(), &patterns(&["X"]));

        assert_eq!(index.total_count(first_root.path()), 1);
        assert_eq!(manager.fs().reads(), 2, "returning to a root reuses its cache");
        assert_eq!(manager.get_stats().roots, 2);

        manager.clear_all();
        assert_eq!(manager.get_stats().cached_files, 0);
    }
}
