use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::style::Style;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info, warn};
use tui_textarea::TextArea;

use super::scroll::ScrollState;
use super::theme::{resolve_theme, ColorMode, Palette, TerminalCapability, ThemeName};
use super::tree::{FileTree, TreeAction, TreeKey, TreeNode};
use crate::cache::CacheManager;
use crate::constants::{COMMENT_PATTERNS_STATE_KEY, EDITOR_PLACEHOLDER, THEME_STATE_KEY};
use crate::index::{PatternSet, ScanOptions};
use crate::state::{StateStore, Subscription};
use crate::utils::FileSystemWatcher;

/// Which surface receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Navigating the tree; global shortcuts active
    Browsing,
    /// Pattern editor open; only Ctrl+C escapes
    Editing,
}

/// Side effects the UI loop performs on behalf of the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEffect {
    Open(PathBuf),
}

/// Startup settings resolved from config, CLI and persisted state
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub root: PathBuf,
    pub options: ScanOptions,
    pub theme: ThemeName,
    pub color_mode: ColorMode,
    pub capability: TerminalCapability,
    pub dim_non_active_depth: bool,
}

/// Application state
pub struct App {
    /// Is the app running?
    pub running: bool,
    pub state: AppState,
    pub tree: FileTree,
    /// Rows from the last refresh
    pub nodes: Vec<TreeNode>,
    pub scroll: ScrollState,
    /// Active marker set
    pub patterns: PatternSet,
    pub editor: TextArea<'static>,
    /// Validation message shown under the editor
    pub error: Option<String>,
    /// Last node chosen with Enter
    pub selected_path: Option<PathBuf>,
    pub theme: ThemeName,
    pub color_mode: ColorMode,
    pub capability: TerminalCapability,
    pub dim_non_active_depth: bool,
    /// Rows available to the tree panel in the last frame
    pub viewport_height: usize,
    pub status_message: Option<String>,
    cache: CacheManager,
    store: StateStore,
    state_rx: Receiver<(String, Value)>,
    _subscription: Subscription,
    watcher: Option<FileSystemWatcher>,
}

impl App {
    /// Create a new app instance and run the first scan
    pub fn new(settings: AppSettings, store: StateStore) -> Self {
        let patterns = load_patterns(&store);

        let (tx, state_rx) = mpsc::channel();
        let subscription = store.subscribe(move |key, value| {
            let _ = tx.send((key.to_string(), value.clone()));
        });

        let mut app = Self {
            running: true,
            state: AppState::Browsing,
            tree: FileTree::new(settings.root, settings.options.clone()),
            nodes: Vec::new(),
            scroll: ScrollState::default(),
            editor: new_editor(&patterns),
            patterns,
            error: None,
            selected_path: None,
            theme: settings.theme,
            color_mode: settings.color_mode,
            capability: settings.capability,
            dim_non_active_depth: settings.dim_non_active_depth,
            viewport_height: 0,
            status_message: None,
            cache: CacheManager::new(settings.options),
            store,
            state_rx,
            _subscription: subscription,
            watcher: None,
        };
        app.refresh();
        app
    }

    /// Start live refresh; a watcher failure only disables it
    pub fn start_watching(&mut self) {
        match FileSystemWatcher::new(self.tree.root(), self.cache.options().clone()) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => warn!("File watching disabled: {}", e),
        }
    }

    pub fn palette(&self) -> Palette {
        resolve_theme(self.theme, self.color_mode, self.capability)
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Rescan if needed and rebuild the visible rows
    pub fn refresh(&mut self) {
        let index = self.cache.index(self.tree.root(), &self.patterns);
        self.nodes = self.tree.visible_nodes(self.cache.fs(), index.as_ref());
        self.tree.clamp_selection(self.nodes.len());
        self.follow_selection();
    }

    fn follow_selection(&mut self) {
        self.scroll
            .follow(self.tree.selected(), self.nodes.len(), self.viewport_height);
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        if self.viewport_height != height {
            self.viewport_height = height;
            self.follow_selection();
        }
    }

    /// Apply store notifications and watcher events; true when a redraw is due
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        while let Ok((key, value)) = self.state_rx.try_recv() {
            changed |= self.apply_state_change(&key, &value);
        }

        if self
            .watcher
            .as_ref()
            .is_some_and(|watcher| watcher.has_relevant_changes())
        {
            debug!("Relevant file change, rescanning");
            self.cache.invalidate();
            changed = true;
        }

        if changed {
            self.refresh();
        }
        changed
    }

    fn apply_state_change(&mut self, key: &str, value: &Value) -> bool {
        match key {
            COMMENT_PATTERNS_STATE_KEY => {
                let patterns = patterns_from_value(value).unwrap_or_else(PatternSet::defaults);
                if patterns == self.patterns {
                    return false;
                }
                self.patterns = patterns;
                if self.state == AppState::Browsing {
                    self.editor = new_editor(&self.patterns);
                }
                true
            }
            THEME_STATE_KEY => match value.as_str().map(str::parse::<ThemeName>) {
                Some(Ok(theme)) if theme != self.theme => {
                    self.theme = theme;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Dispatch a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppEffect> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return None;
        }

        let effect = match self.state {
            AppState::Editing => {
                match key.code {
                    KeyCode::Esc => self.cancel_edit(),
                    KeyCode::Enter => self.save_patterns(),
                    _ => {
                        self.editor.input(key);
                    }
                }
                None
            }
            AppState::Browsing => self.handle_browse_key(key),
        };

        self.refresh();
        effect
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Option<AppEffect> {
        let tree_key = match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.quit();
                return None;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.start_edit();
                return None;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.cycle_theme();
                return None;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.rescan();
                return None;
            }
            KeyCode::Up => TreeKey::Up,
            KeyCode::Down => TreeKey::Down,
            KeyCode::Left => TreeKey::Left,
            KeyCode::Right => TreeKey::Right,
            KeyCode::Enter => TreeKey::Enter,
            _ => return None,
        };

        match self.tree.handle_key(tree_key, &self.nodes)? {
            TreeAction::Select { path, is_directory } => {
                self.selected_path = Some(path.clone());
                (!is_directory).then_some(AppEffect::Open(path))
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.scroll_up(self.nodes.len(), self.viewport_height),
            MouseEventKind::ScrollDown => {
                self.scroll.scroll_down(self.nodes.len(), self.viewport_height)
            }
            _ => {}
        }
    }

    pub fn start_edit(&mut self) {
        self.editor = new_editor(&self.patterns);
        self.error = None;
        self.state = AppState::Editing;
    }

    /// Drop edits and restore the current markers
    pub fn cancel_edit(&mut self) {
        self.editor = new_editor(&self.patterns);
        self.error = None;
        self.state = AppState::Browsing;
    }

    /// Validate the editor text, then persist and apply it
    pub fn save_patterns(&mut self) {
        let raw = self.editor.lines().join("\n");
        let patterns = match PatternSet::parse(&raw) {
            Ok(patterns) => patterns,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        if let Err(e) = self.store.set(COMMENT_PATTERNS_STATE_KEY, &patterns) {
            warn!("Could not persist markers: {:#}", e);
            self.set_status("Markers applied but not saved");
        }
        info!("Markers set to {}", patterns.display());
        self.patterns = patterns;
        self.editor = new_editor(&self.patterns);
        self.error = None;
        self.state = AppState::Browsing;
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        if let Err(e) = self.store.set(THEME_STATE_KEY, &self.theme) {
            warn!("Could not persist theme: {:#}", e);
        }
        self.set_status(format!("Theme: {}", self.theme));
    }

    /// Forget the memoized scan; unchanged files still come from the cache
    pub fn rescan(&mut self) {
        self.cache.invalidate();
        self.refresh();
        if let Some(stats) = self.cache.last_stats() {
            self.set_status(format!(
                "Rescanned {} files, {} read",
                stats.files,
                stats.files_read()
            ));
        }
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.nodes.get(self.tree.selected())
    }

    pub fn root(&self) -> &Path {
        self.tree.root()
    }
}

fn new_editor(patterns: &PatternSet) -> TextArea<'static> {
    let mut editor = TextArea::new(vec![patterns.display()]);
    editor.set_placeholder_text(EDITOR_PLACEHOLDER);
    editor.set_cursor_line_style(Style::default());
    editor.move_cursor(tui_textarea::CursorMove::End);
    editor
}

/// `Some` only for a JSON array made entirely of strings
fn patterns_from_value(value: &Value) -> Option<PatternSet> {
    let items = value.as_array()?;
    let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
    Some(PatternSet::from_stored(strings?))
}

/// Persisted markers, normalized; rewrites the stored value when it was not canonical
pub fn load_patterns(store: &StateStore) -> PatternSet {
    let Some(raw) = store.get_value(COMMENT_PATTERNS_STATE_KEY) else {
        return PatternSet::defaults();
    };

    let patterns = patterns_from_value(&raw).unwrap_or_else(PatternSet::defaults);
    let canonical = serde_json::to_value(&patterns).unwrap_or(Value::Null);
    if canonical != raw {
        debug!("Normalizing stored markers");
        if let Err(e) = store.set(COMMENT_PATTERNS_STATE_KEY, &patterns) {
            warn!("Could not rewrite stored markers: {:#}", e);
        }
    }
    patterns
}

/// Persisted theme, or `fallback` when none was stored
pub fn load_theme(store: &StateStore, fallback: ThemeName) -> ThemeName {
    store
        .get_value(THEME_STATE_KEY)
        .and_then(|value| value.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(fallback)
}
