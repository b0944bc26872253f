use std::path::Path;

use super::fs::DirEntryInfo;
use crate::constants::{DEFAULT_MAX_DEPTH, EXCLUDED_DIRS, FILE_EXTENSIONS};

/// Which entries a scan (and the tree view) looks at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanOptions {
    /// Lower-case extensions without the dot; empty means every file
    pub file_extensions: Vec<String>,
    /// Directory names that are never descended into
    pub excluded_dirs: Vec<String>,
    /// Deepest level below the root that is still listed
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            file_extensions: FILE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excluded_dirs: EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ScanOptions {
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Extension allow-list check; applies to leaves only
    pub fn accepts_file(&self, name: &str) -> bool {
        if self.file_extensions.is_empty() {
            return true;
        }
        Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.file_extensions.iter().any(|e| *e == ext))
    }

    /// Whether a listed entry takes part in the scan at all
    pub fn accepts(&self, entry: &DirEntryInfo, show_hidden: bool) -> bool {
        if !show_hidden && Self::is_hidden(&entry.name) {
            return false;
        }
        if entry.is_dir() {
            return !self.is_excluded_dir(&entry.name);
        }
        self.accepts_file(&entry.name)
    }

    /// Whether a changed path below `root` could affect scan results
    pub fn is_relevant_change(&self, root: &Path, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return false;
        };
        for component in relative.components() {
            let name = component.as_os_str().to_string_lossy();
            if Self::is_hidden(&name) || self.is_excluded_dir(&name) {
                return false;
            }
        }
        // A removed path may have been a directory, so only existing files are filtered
        !path.is_file() || self.accepts_file(&relative.to_string_lossy())
    }

    /// Summary line shown in the status bar
    pub fn filter_summary(&self) -> String {
        let filters = if self.file_extensions.is_empty() {
            "*".to_string()
        } else {
            self.file_extensions
                .iter()
                .map(|e| format!("*.{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Filters: {} | Excluded: {} | Sort: comment count desc",
            filters,
            self.excluded_dirs.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fs::EntryKind;
    use std::path::PathBuf;

    fn entry(name: &str, kind: EntryKind) -> DirEntryInfo {
        DirEntryInfo {
            name: name.to_string(),
            path: PathBuf::from("/root").join(name),
            kind,
        }
    }

    #[test]
    fn test_accepts() {
        let options = ScanOptions::default();

        assert!(options.accepts(&entry("a.ts", EntryKind::File), false));
        assert!(options.accepts(&entry("B.TSX", EntryKind::File), false));
        assert!(!options.accepts(&entry("a.rs", EntryKind::File), false));
        assert!(!options.accepts(&entry("README", EntryKind::File), false));

        // Directories are always traversed regardless of extension
        assert!(options.accepts(&entry("lib.rs", EntryKind::Directory), false));
        assert!(!options.accepts(&entry("node_modules", EntryKind::Directory), false));

        assert!(!options.accepts(&entry(".hidden.ts", EntryKind::File), false));
        assert!(!options.accepts(&entry(".git", EntryKind::Directory), false));
        assert!(options.accepts(&entry(".hidden.ts", EntryKind::File), true));
    }

    #[test]
    fn test_empty_extension_list_accepts_all_files() {
        let options = ScanOptions {
            file_extensions: vec![],
            ..ScanOptions::default()
        };
        assert!(options.accepts_file("Makefile"));
    }

    #[test]
    fn test_is_relevant_change() {
        let options = ScanOptions::default();
        let root = Path::new("/nonexistent-root");

        assert!(options.is_relevant_change(root, &root.join("src/a.ts")));
        assert!(!options.is_relevant_change(root, &root.join("node_modules/x/a.ts")));
        assert!(!options.is_relevant_change(root, &root.join(".git/index")));
        assert!(!options.is_relevant_change(Path::new("/elsewhere"), &root.join("a.ts")));
    }

    #[test]
    fn test_filter_summary() {
        assert_eq!(
            ScanOptions::default().filter_summary(),
            "Filters: *.js, *.ts, *.jsx, *.tsx | Excluded: node_modules | Sort: comment count desc"
        );
    }
}
