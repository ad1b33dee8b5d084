//! Files on the real filesystem.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::{FileSystem, StoreFile, validate_path};
use crate::config;

/// A file system rooted at one directory on disk.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    root: PathBuf,
    preallocate: bool,
}

impl OsFileSystem {
    /// Create a file system rooted at `root`, using the global preallocation setting.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            preallocate: config::get().preallocate,
        }
    }

    /// Override whether files are extended to their declared length on open.
    pub fn with_preallocate(mut self, enabled: bool) -> Self {
        self.preallocate = enabled;
        self
    }

    /// Root directory of this file system.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve declared path components under the root.
    pub fn resolve(&self, name: &[String]) -> io::Result<PathBuf> {
        validate_path(name)?;
        Ok(name.iter().fold(self.root.clone(), |path, c| path.join(c)))
    }
}

impl FileSystem for OsFileSystem {
    fn open(&self, name: &[String], length: u64) -> io::Result<Box<dyn StoreFile>> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if self.preallocate && file.metadata()?.len() < length {
            file.set_len(length)?;
        }

        Ok(Box::new(OsFile { file }))
    }
}

/// A handle to a file on disk using positioned I/O.
#[derive(Debug)]
pub struct OsFile {
    file: File,
}

#[cfg(unix)]
impl StoreFile for OsFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(&self.file, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::write_at(&self.file, buf, offset)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        drop(self.file);
        Ok(())
    }
}

#[cfg(windows)]
impl StoreFile for OsFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(&self.file, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_write(&self.file, buf, offset)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        drop(self.file);
        Ok(())
    }
}
