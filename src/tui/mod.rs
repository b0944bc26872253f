// Gateway module for TUI - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod app;
mod opener;
mod render;
mod scroll;
mod theme;
mod tree;
mod ui;

// Public re-exports - the ONLY way to access TUI functionality
pub use app::{load_patterns, load_theme, App, AppEffect, AppSettings, AppState};
pub use opener::open_path;
pub use scroll::{ScrollState, ScrollThumb};
pub use theme::{resolve_theme, ColorMode, Palette, TerminalCapability, ThemeName};
pub use tree::{FileTree, TreeAction, TreeKey, TreeNode};
pub use ui::run_ui;
