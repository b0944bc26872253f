use std::path::Path;
use tracing::debug;

use super::counts::{CountMap, PatternCounts};
use super::fs::FileSystem;
use super::options::ScanOptions;
use super::patterns::PatternSet;
use crate::cache::{count_file, RootFileCache, ScanStats};

/// Result of one indexing pass
#[derive(Debug, Clone, Default)]
pub struct IndexOutput {
    pub count_map: CountMap,
    /// Entries for exactly the files visited in this pass
    pub next_cache: RootFileCache,
    pub stats: ScanStats,
}

/// Walks a subtree once and aggregates marker counts bottom-up
pub struct Indexer<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    options: &'a ScanOptions,
}

/// Mutable state threaded through the recursive walk
struct WalkState<'p> {
    patterns: &'p PatternSet,
    previous: &'p RootFileCache,
    output: IndexOutput,
}

impl<'a, F: FileSystem + ?Sized> Indexer<'a, F> {
    pub fn new(fs: &'a F, options: &'a ScanOptions) -> Self {
        Self { fs, options }
    }

    /// Count `patterns` under `root`, consulting `previous` for each file.
    ///
    /// `previous` is only read; the next cache generation is returned in the output.
    /// An empty pattern set returns an empty map and the previous cache as-is.
    pub fn index(&self, root: &Path, patterns: &PatternSet, previous: &RootFileCache) -> IndexOutput {
        if patterns.is_empty() {
            return IndexOutput {
                next_cache: previous.clone(),
                ..IndexOutput::default()
            };
        }

        let mut state = WalkState {
            patterns,
            previous,
            output: IndexOutput::default(),
        };
        self.walk(root, 0, &mut state);

        let stats = &state.output.stats;
        debug!(
            "Indexed {}: {} dirs, {} files ({} fresh, {} rehashed, {} recomputed, {} new, {} stale)",
            root.display(),
            stats.directories,
            stats.files,
            stats.fresh,
            stats.hash_matches,
            stats.recomputed,
            stats.new_entries,
            stats.stale
        );

        state.output
    }

    fn walk(&self, dir: &Path, depth: usize, state: &mut WalkState<'_>) -> PatternCounts {
        let mut counts = PatternCounts::zeroed(state.patterns);
        state.output.stats.directories += 1;

        if depth < self.options.max_depth {
            match self.fs.read_dir(dir) {
                Ok(entries) => {
                    for entry in entries {
                        if !self.options.accepts(&entry, false) {
                            continue;
                        }

                        let child_counts = if entry.is_dir() {
                            self.walk(&entry.path, depth + 1, state)
                        } else {
                            self.visit_file(&entry.path, state)
                        };
                        counts.accumulate(&child_counts, state.patterns);
                    }
                }
                Err(e) => {
                    debug!("Skipping unreadable directory {}: {}", dir.display(), e);
                    state.output.stats.unreadable_directories += 1;
                }
            }
        }

        state.output.count_map.insert(dir.to_path_buf(), counts.clone());
        counts
    }

    fn visit_file(&self, path: &Path, state: &mut WalkState<'_>) -> PatternCounts {
        let result = count_file(self.fs, path, state.patterns, state.previous.get(path));

        state.output.stats.record(result.outcome);
        state.output.stats.bytes_read += result.bytes_read;
        if let Some(entry) = result.entry {
            state.output.next_cache.insert(path.to_path_buf(), entry);
        }
        state
            .output
            .count_map
            .insert(path.to_path_buf(), result.counts.clone());
        result.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fs::{MockFileSystem, OsFileSystem};
    use crate::index::testing::{write_file, CountingFs};
    use filetime::FileTime;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> PatternSet {
        PatternSet::new(list.iter().copied()).unwrap()
    }

    fn run(root: &Path, list: &[&str], previous: &RootFileCache) -> IndexOutput {
        let options = ScanOptions::default();
        Indexer::new(&OsFileSystem, &options).index(root, &patterns(list), previous)
    }

    /// Every directory equals the sum of its recorded immediate children
    fn assert_aggregation(map: &CountMap, list: &[&str]) {
        for (path, counts) in map {
            let children: Vec<&PatternCounts> = map
                .iter()
                .filter(|(child, _)| child.parent() == Some(path.as_path()))
                .map(|(_, c)| c)
                .collect();
            if path.is_dir() {
                for pattern in list {
                    let sum: u64 = children.iter().map(|c| c.get(pattern)).sum();
                    assert_eq!(counts.get(pattern), sum, "{} {}", path.display(), pattern);
                }
            }
        }
    }

    #[test]
    fn test_basic_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "a.ts", "// TODO: x\n// TODO: y\n");
        write_file(root, "b.js", "const b = 1;\n");

        let output = run(root, &["TODO:"], &RootFileCache::new());

        assert_eq!(output.count_map.len(), 3);
        assert_eq!(output.count_map[&root.join("a.ts")].get("TODO:"), 2);
        assert_eq!(output.count_map[&root.join("b.js")].get("TODO:"), 0);
        assert!(output.count_map[&root.join("b.js")].contains("TODO:"));
        assert_eq!(output.count_map[root].get("TODO:"), 2);
        assert_eq!(output.next_cache.len(), 2);
    }

    #[test]
    fn test_nested_aggregation() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "src/a.ts", "A A B");
        write_file(root, "src/deep/b.tsx", "A B B B");
        write_file(root, "src/deep/deeper/c.jsx", "B");
        write_file(root, "lib/d.js", "A");
        fs::create_dir_all(root.join("empty/inner")).unwrap();

        let output = run(root, &["A", "B"], &RootFileCache::new());

        assert_aggregation(&output.count_map, &["A", "B"]);
        assert_eq!(output.count_map[root].get("A"), 4);
        assert_eq!(output.count_map[root].get("B"), 5);
        assert_eq!(output.count_map[&root.join("src/deep")].get("B"), 4);

        // Directories with nothing to count are still recorded
        assert_eq!(output.count_map[&root.join("empty/inner")].total(&patterns(&["A", "B"])), 0);
    }

    #[test]
    fn test_exclusions_never_appear() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "node_modules/pkg/index.ts", "TODO:");
        write_file(root, ".hidden/a.ts", "TODO:");
        write_file(root, ".dot.ts", "TODO:");
        write_file(root, "notes.md", "TODO:");
        write_file(root, "src/node_modules/x.js", "TODO:");
        write_file(root, "src/ok.ts", "TODO:");

        let output = run(root, &["TODO:"], &RootFileCache::new());

        for path in output.count_map.keys() {
            let relative = path.strip_prefix(root).unwrap();
            for component in relative.components() {
                let name = component.as_os_str().to_string_lossy();
                assert!(!name.starts_with('.'), "{}", path.display());
                assert_ne!(name, "node_modules");
            }
        }
        assert!(!output.count_map.contains_key(&root.join("notes.md")));
        assert_eq!(output.count_map[root].get("TODO:"), 1);
    }

    #[test]
    fn test_empty_patterns_short_circuit() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.ts", "TODO:");
        let previous = run(temp_dir.path(), &["TODO:"], &RootFileCache::new()).next_cache;

        let options = ScanOptions::default();
        let output =
            Indexer::new(&OsFileSystem, &options).index(temp_dir.path(), &PatternSet::default(), &previous);

        assert!(output.count_map.is_empty());
        assert_eq!(output.next_cache, previous);
        assert_eq!(output.stats, ScanStats::default());
    }

    #[test]
    fn test_second_scan_is_idempotent_and_reads_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "a.ts", "TODO: TODO:");
        write_file(root, "sub/b.ts", "TODO:");

        let fs = CountingFs::default();
        let options = ScanOptions::default();
        let indexer = Indexer::new(&fs, &options);
        let list = patterns(&["TODO:"]);

        let first = indexer.index(root, &list, &RootFileCache::new());
        assert_eq!(fs.reads(), 2);

        let second = indexer.index(root, &list, &first.next_cache);
        assert_eq!(fs.reads(), 2, "unchanged files must not be re-read");
        assert_eq!(second.count_map, first.count_map);
        assert_eq!(second.next_cache, first.next_cache);
        assert_eq!(second.stats.fresh, 2);
    }

    #[test]
    fn test_touch_without_edit_skips_recount() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = write_file(root, "a.ts", "TODO:");
        let first = run(root, &["TODO:"], &RootFileCache::new());

        filetime::set_file_mtime(&file, FileTime::from_unix_time(1_000_000, 0)).unwrap();
        let second = run(root, &["TODO:"], &first.next_cache);

        assert_eq!(second.stats.hash_matches, 1);
        assert_eq!(second.stats.recomputed, 0);
        assert_eq!(second.count_map, first.count_map);
        let entry = &second.next_cache[&file];
        assert_eq!(entry.hash, first.next_cache[&file].hash);
        assert_ne!(entry.modified, first.next_cache[&file].modified);
    }

    #[test]
    fn test_edit_recomputes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = write_file(root, "a.ts", "TODO: FIXME");
        let first = run(root, &["TODO:", "FIXME"], &RootFileCache::new());

        fs::write(&file, "TODO: TODO: TODO:").unwrap();
        filetime::set_file_mtime(&file, FileTime::from_unix_time(2_000_000, 0)).unwrap();
        let second = run(root, &["TODO:"], &first.next_cache);

        assert_eq!(second.stats.recomputed, 1);
        assert_eq!(second.count_map[&file].get("TODO:"), 3);
        assert_eq!(second.count_map[root].get("TODO:"), 3);
        assert!(!second.next_cache[&file].pattern_counts.contains("FIXME"));
    }

    #[test]
    fn test_pattern_accumulation_across_queries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = write_file(root, "a.ts", "A B B");

        let fs = CountingFs::default();
        let options = ScanOptions::default();
        let indexer = Indexer::new(&fs, &options);

        let first = indexer.index(root, &patterns(&["A"]), &RootFileCache::new());
        let second = indexer.index(root, &patterns(&["A", "B"]), &first.next_cache);

        assert_eq!(second.stats.hash_matches, 1);
        assert_eq!(second.count_map[&file].get("B"), 2);
        let entry = &second.next_cache[&file];
        assert_eq!(entry.pattern_counts.get("A"), 1);
        assert_eq!(entry.pattern_counts.get("B"), 2);

        // Going back to {A} needs no read at all
        let reads = fs.reads();
        let third = indexer.index(root, &patterns(&["A"]), &second.next_cache);
        assert_eq!(fs.reads(), reads);
        assert_eq!(third.count_map[&file].len(), 1);
    }

    #[test]
    fn test_removed_files_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let keep = write_file(root, "keep.ts", "TODO:");
        let gone = write_file(root, "gone.ts", "TODO:");
        let first = run(root, &["TODO:"], &RootFileCache::new());
        assert!(first.next_cache.contains_key(&gone));

        fs::remove_file(&gone).unwrap();
        let second = run(root, &["TODO:"], &first.next_cache);

        assert!(!second.next_cache.contains_key(&gone));
        assert!(!second.count_map.contains_key(&gone));
        assert!(second.next_cache.contains_key(&keep));
        assert_eq!(second.count_map[root].get("TODO:"), 1);
    }

    #[test]
    fn test_unreadable_directory_contributes_zero() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        write_file(&root, "ok/a.ts", "TODO:");
        write_file(&root, "locked/b.ts", "TODO: TODO:");

        let mut fs = MockFileSystem::new();
        fs.expect_read_dir().returning(|path: &Path| {
            if path.ends_with("locked") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            } else {
                OsFileSystem.read_dir(path)
            }
        });
        fs.expect_stat().returning(|path: &Path| OsFileSystem.stat(path));
        fs.expect_read().returning(|path: &Path| OsFileSystem.read(path));

        let options = ScanOptions::default();
        let output = Indexer::new(&fs, &options).index(&root, &patterns(&["TODO:"]), &RootFileCache::new());

        assert_eq!(output.stats.unreadable_directories, 1);
        assert_eq!(output.count_map[&root.join("locked")].get("TODO:"), 0);
        assert_eq!(output.count_map[&root].get("TODO:"), 1);
    }

    #[test]
    fn test_max_depth_bounds_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "top.ts", "X");
        write_file(root, "one/mid.ts", "X");
        write_file(root, "one/two/deep.ts", "X");

        let options = ScanOptions {
            max_depth: 2,
            ..ScanOptions::default()
        };
        let output = Indexer::new(&OsFileSystem, &options).index(root, &patterns(&["X"]), &RootFileCache::new());

        let deep_dir: PathBuf = root.join("one/two");
        assert_eq!(output.count_map[&deep_dir].get("X"), 0);
        assert!(!output.count_map.contains_key(&deep_dir.join("deep.ts")));
        assert_eq!(output.count_map[root].get("X"), 2);
    }
}
