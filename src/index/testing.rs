//! Test doubles shared by the index and cache tests

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::fs::{DirEntryInfo, FileStat, FileSystem, OsFileSystem};

/// Real filesystem that counts content reads
#[derive(Debug, Default)]
pub struct CountingFs {
    reads: Cell<usize>,
}

impl CountingFs {
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl FileSystem for CountingFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        OsFileSystem.read_dir(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        OsFileSystem.stat(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.set(self.reads.get() + 1);
        OsFileSystem.read(path)
    }
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
