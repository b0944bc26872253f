// Gateway module for index - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod counts;
mod fs;
mod indexer;
mod options;
mod patterns;
mod query;

#[cfg(test)]
pub(crate) mod testing;

// Public re-exports - the ONLY way to access index functionality
pub use counts::{CountMap, PatternCounts};
pub use fs::{DirEntryInfo, EntryKind, FileStat, FileSystem, OsFileSystem};
pub use indexer::{IndexOutput, Indexer};
pub use options::ScanOptions;
pub use patterns::{count_matches, normalize, PatternSet};
pub use query::{
    compare_names, CountIndex, DefaultDecorator, LabelPlacement, LabelTone, SortEntry,
    TreeDecorator, TreeLabel,
};

#[cfg(test)]
pub(crate) use fs::MockFileSystem;
