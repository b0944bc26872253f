pub mod app;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod index;
pub mod runtime;
pub mod state;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use cache::CacheManager;
pub use index::{CountIndex, Indexer, PatternSet, ScanOptions};
pub use tui::run_ui;
pub use utils::MarktreeError;
