/// Constants module to avoid magic numbers in the codebase

// Scanning
pub const FILE_EXTENSIONS: &[&str] = &["js", "ts", "jsx", "tsx"];
pub const EXCLUDED_DIRS: &[&str] = &["node_modules"];
pub const DEFAULT_MAX_DEPTH: usize = 10;

// Markers
pub const DEFAULT_COMMENT_PATTERNS: &[&str] = &["@ts-expect-error"];
pub const MAX_COMMENT_PATTERNS: usize = 4;

// Persisted state keys
pub const COMMENT_PATTERNS_STATE_KEY: &str = "ttFsCommentPatterns";
pub const THEME_STATE_KEY: &str = "ttFsTheme";
pub const STATE_FILE_NAME: &str = "state.json";
pub const LOG_FILE_NAME: &str = "marktree.log";

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: usize = 1;
pub const DEFAULT_FOCUS_PADDING: usize = 2;
pub const COMMENT_COUNT_COLUMN_START: usize = 62;
pub const MIN_COMMENT_LEADER_LENGTH: usize = 4;

pub const HINT_TEXT: &str = "↑/↓/→/← | Press C to edit patterns | T theme | R rescan";
pub const EDITING_HINT_TEXT: &str = " (editing: Enter save, Esc cancel)";
pub const EDITOR_PROMPT: &str = "Comment markers (comma/newline separated, max 4):";
pub const EDITOR_PLACEHOLDER: &str = "TODO:, @ts-ignore";
pub const FOOTER_TEXT: &str = " env: local | q quit";

// Tree glyphs
pub const TREE_VERTICAL: char = '│';
pub const TREE_BRANCH: char = '├';
pub const TREE_LAST_BRANCH: char = '└';
pub const TREE_HORIZONTAL: char = '─';
pub const FOLDER_OPEN: char = 'v';
pub const FOLDER_CLOSED: char = '>';
pub const FILE_ICON: char = '·';
pub const LEADER_CHAR: char = '·';
