mod cache_manager;
mod file_cache;
mod types;

pub use cache_manager::{CacheManager, CacheStats};
pub use file_cache::{count_file, hash_content, FileCountResult};
pub use types::{CountOutcome, FileCacheEntry, RootFileCache, ScanStats};
