use anyhow::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use crate::index::ScanOptions;

/// Events that we care about for the file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(Vec<PathBuf>),
    Modified(Vec<PathBuf>),
    Deleted(Vec<PathBuf>),
}

impl FileEvent {
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            FileEvent::Created(paths) | FileEvent::Modified(paths) | FileEvent::Deleted(paths) => {
                paths
            }
        }
    }
}

/// Watches a scan root and reports changes that can move marker counts
pub struct FileSystemWatcher {
    root: PathBuf,
    options: ScanOptions,
    _watcher: RecommendedWatcher,
    rx: Receiver<Result<Event, notify::Error>>,
}

impl FileSystemWatcher {
    /// Create a new file system watcher for the given root
    pub fn new(root: &Path, options: ScanOptions) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |event| {
            let _ = tx.send(event);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            root: root.to_path_buf(),
            options,
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events (non-blocking), keeping relevant paths only
    pub fn check_events(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();

        while let Ok(Ok(event)) = self.rx.try_recv() {
            let paths: Vec<PathBuf> = event
                .paths
                .into_iter()
                .filter(|path| self.options.is_relevant_change(&self.root, path))
                .collect();
            if paths.is_empty() {
                continue;
            }

            match event.kind {
                EventKind::Create(_) => events.push(FileEvent::Created(paths)),
                EventKind::Modify(modify_kind) => {
                    use notify::event::ModifyKind;
                    match modify_kind {
                        // Renames show up as a modify on both ends
                        ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any => {
                            events.push(FileEvent::Modified(paths))
                        }
                        _ => {}
                    }
                }
                EventKind::Remove(_) => events.push(FileEvent::Deleted(paths)),
                _ => {}
            }
        }

        events
    }

    /// True when anything relevant changed since the last call
    pub fn has_relevant_changes(&self) -> bool {
        !self.check_events().is_empty()
    }
}
