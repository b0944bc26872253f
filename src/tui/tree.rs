use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    COMMENT_COUNT_COLUMN_START, FILE_ICON, FOLDER_CLOSED, FOLDER_OPEN, MIN_COMMENT_LEADER_LENGTH,
    TREE_BRANCH, TREE_HORIZONTAL, TREE_LAST_BRANCH, TREE_VERTICAL,
};
use crate::index::{FileSystem, ScanOptions, SortEntry, TreeDecorator, TreeLabel};

/// One visible row of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub depth: usize,
    pub is_last: bool,
    /// `is_last` of each ancestor between the root and this node
    pub parent_is_last: Vec<bool>,
    pub labels: Vec<TreeLabel>,
}

impl TreeNode {
    pub fn parent(&self) -> Option<&Path> {
        if self.depth == 0 {
            None
        } else {
            self.path.parent()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    Select { path: PathBuf, is_directory: bool },
}

/// Expandable directory tree with a single selection
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    options: ScanOptions,
    show_hidden: bool,
    expanded: HashSet<PathBuf>,
    selected: usize,
}

impl FileTree {
    /// Create a new tree with only the root expanded
    pub fn new(root: PathBuf, options: ScanOptions) -> Self {
        let mut expanded = HashSet::new();
        expanded.insert(root.clone());
        Self {
            root,
            options,
            show_hidden: false,
            expanded,
            selected: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        self.show_hidden = show_hidden;
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// Depth-first list of rows under expanded directories
    pub fn visible_nodes<F, D>(&self, fs: &F, decorator: &D) -> Vec<TreeNode>
    where
        F: FileSystem + ?Sized,
        D: TreeDecorator + ?Sized,
    {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string());
        let root_entry = SortEntry {
            name: name.clone(),
            path: self.root.clone(),
            is_directory: true,
        };

        let mut nodes = vec![TreeNode {
            name,
            path: self.root.clone(),
            is_directory: true,
            depth: 0,
            is_last: true,
            parent_is_last: Vec::new(),
            labels: decorator.labels(&root_entry),
        }];
        if self.is_expanded(&self.root) {
            self.push_children(fs, decorator, &self.root, 0, &[], &mut nodes);
        }
        nodes
    }

    fn push_children<F, D>(
        &self,
        fs: &F,
        decorator: &D,
        dir: &Path,
        depth: usize,
        ancestors: &[bool],
        nodes: &mut Vec<TreeNode>,
    ) where
        F: FileSystem + ?Sized,
        D: TreeDecorator + ?Sized,
    {
        if depth >= self.options.max_depth {
            return;
        }
        let entries = match fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list {}: {}", dir.display(), e);
                return;
            }
        };

        let mut children: Vec<SortEntry> = entries
            .iter()
            .filter(|entry| self.options.accepts(entry, self.show_hidden))
            .map(|entry| SortEntry {
                name: entry.name.clone(),
                path: entry.path.clone(),
                is_directory: entry.is_dir(),
            })
            .collect();
        children.sort_by(|l, r| decorator.compare(l, r));

        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let labels = decorator.labels(&child);
            let expanded = child.is_directory && self.is_expanded(&child.path);
            let path = child.path.clone();
            nodes.push(TreeNode {
                name: child.name,
                path: child.path,
                is_directory: child.is_directory,
                depth: depth + 1,
                is_last,
                parent_is_last: ancestors.to_vec(),
                labels,
            });
            if expanded {
                let mut next = ancestors.to_vec();
                next.push(is_last);
                self.push_children(fs, decorator, &path, depth + 1, &next, nodes);
            }
        }
    }

    /// Keep the selection inside a list of `len` rows
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn select_path(&mut self, path: &Path, nodes: &[TreeNode]) {
        if let Some(index) = nodes.iter().position(|n| n.path == path) {
            self.selected = index;
        }
    }

    /// Apply a navigation key against the rows currently on screen
    pub fn handle_key(&mut self, key: TreeKey, nodes: &[TreeNode]) -> Option<TreeAction> {
        self.clamp_selection(nodes.len());
        let node = nodes.get(self.selected)?;

        match key {
            TreeKey::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TreeKey::Down => {
                self.selected = (self.selected + 1).min(nodes.len() - 1);
                None
            }
            TreeKey::Right => {
                if node.is_directory && !self.is_expanded(&node.path) {
                    self.expanded.insert(node.path.clone());
                }
                None
            }
            TreeKey::Left => {
                if node.is_directory && self.is_expanded(&node.path) {
                    self.collapse_subtree(&node.path);
                } else if let Some(parent) = node.parent() {
                    self.select_path(parent, nodes);
                }
                None
            }
            TreeKey::Enter => {
                if node.is_directory && !self.is_expanded(&node.path) {
                    self.expanded.insert(node.path.clone());
                    None
                } else {
                    Some(TreeAction::Select {
                        path: node.path.clone(),
                        is_directory: node.is_directory,
                    })
                }
            }
        }
    }

    /// Collapse `path` and every expanded directory below it
    pub fn collapse_subtree(&mut self, path: &Path) {
        self.expanded.retain(|p| !p.starts_with(path));
    }
}

/// Guide-line prefix such as `│ ├─`
pub fn guide_prefix(node: &TreeNode) -> String {
    if node.depth == 0 {
        return String::new();
    }
    let mut prefix = String::new();
    for last in &node.parent_is_last {
        if *last {
            prefix.push_str("  ");
        } else {
            prefix.push(TREE_VERTICAL);
            prefix.push(' ');
        }
    }
    prefix.push(if node.is_last {
        TREE_LAST_BRANCH
    } else {
        TREE_BRANCH
    });
    prefix.push(TREE_HORIZONTAL);
    prefix
}

pub fn node_icon(node: &TreeNode, expanded: bool) -> char {
    match (node.is_directory, expanded) {
        (true, true) => FOLDER_OPEN,
        (true, false) => FOLDER_CLOSED,
        (false, _) => FILE_ICON,
    }
}

/// Dotted leader length in front of the count column
pub fn leader_len(row_content_len: usize) -> usize {
    COMMENT_COUNT_COLUMN_START
        .saturating_sub(row_content_len)
        .max(MIN_COMMENT_LEADER_LENGTH)
}

/// Whether `node` shares a parent and depth with `focused`
pub fn in_active_layer(node: &TreeNode, focused: &TreeNode) -> bool {
    node.depth == focused.depth && node.parent() == focused.parent()
}
