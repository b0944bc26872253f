use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::{
    cache::{CacheManager, ScanStats},
    cli::OutputFormat,
    index::{compare_names, PatternCounts, PatternSet, ScanOptions},
};

/// Result of a non-interactive scan
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// Scanned directory
    pub root: PathBuf,
    /// Markers that were counted, in display order
    pub patterns: Vec<String>,
    /// Counts summed over the whole tree
    pub totals: PatternCounts,
    /// Files with at least one match, busiest first
    pub files: Vec<FileResult>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct FileResult {
    /// Path relative to the root, `/`-separated
    pub path: String,
    pub total: u64,
    pub counts: PatternCounts,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Execution time in milliseconds
    pub duration_ms: u128,
    pub stats: ScanStats,
}

/// Runs one scan and formats it for a pipe or a terminal
pub struct NonInteractiveRunner {
    root: PathBuf,
    patterns: PatternSet,
    options: ScanOptions,
}

impl NonInteractiveRunner {
    /// Create a new non-interactive runner
    pub fn new(root: PathBuf, patterns: PatternSet, options: ScanOptions) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Cannot scan {}", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {}", root.display());
        }
        Ok(Self {
            root,
            patterns,
            options,
        })
    }

    /// Scan the tree and collect per-file results
    pub fn execute(&self) -> Result<NonInteractiveResult> {
        let start_time = Instant::now();
        let mut manager = CacheManager::new(self.options.clone());
        let index = manager.index(&self.root, &self.patterns);
        let stats = manager.last_stats().unwrap_or_default();

        let totals = index
            .counts(&self.root)
            .map(|counts| counts.select(&self.patterns))
            .unwrap_or_else(|| PatternCounts::zeroed(&self.patterns));

        let mut files: Vec<FileResult> = manager
            .root_cache(&self.root)
            .into_iter()
            .flat_map(|cache| cache.keys())
            .filter_map(|path| {
                let total = index.total_count(path);
                if total == 0 {
                    return None;
                }
                let counts = index.counts(path)?.select(&self.patterns);
                Some(FileResult {
                    path: relative_display(&self.root, path),
                    total,
                    counts,
                })
            })
            .collect();
        files.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| compare_names(&a.path, &b.path))
        });

        let duration_ms = start_time.elapsed().as_millis();
        info!(
            "Scanned {} files in {}ms ({} bytes read)",
            stats.files, duration_ms, stats.bytes_read
        );

        Ok(NonInteractiveResult {
            root: self.root.clone(),
            patterns: self.patterns.as_slice().to_vec(),
            totals,
            files,
            metadata: ExecutionMetadata { duration_ms, stats },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();
                output.push_str(&format!(
                    "{} {}\n",
                    "Scanned".bold(),
                    result.root.display()
                ));

                for pattern in &result.patterns {
                    output.push_str(&format!(
                        "  {}: {}\n",
                        pattern.cyan(),
                        result.totals.get(pattern)
                    ));
                }

                if !result.files.is_empty() {
                    output.push_str("\n--- Files ---\n");
                    let width = result.files[0].total.to_string().len();
                    for file in &result.files {
                        let detail: Vec<String> = result
                            .patterns
                            .iter()
                            .map(|p| (p, file.counts.get(p)))
                            .filter(|(_, count)| *count > 0)
                            .map(|(p, count)| format!("{p}: {count}"))
                            .collect();
                        output.push_str(&format!(
                            "{:>width$}  {}  {}\n",
                            file.total.to_string().yellow(),
                            file.path,
                            detail.join(", ").dimmed(),
                        ));
                    }
                }

                let stats = &result.metadata.stats;
                output.push_str(&format!(
                    "\n{} files, {} read, {}ms\n",
                    stats.files,
                    stats.files_read(),
                    result.metadata.duration_ms
                ));

                output
            }
        }
    }
}

fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
