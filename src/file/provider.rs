//! Providers that create one file system per torrent directory.

use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{FileSystem, MemFileSystem, OsFileSystem, validate_component};
use crate::config;

/// Creates the file system a torrent's files live in.
pub trait FsProvider: Send + Sync {
    /// Create a file system for the torrent stored under `directory`.
    fn new_fs(&self, directory: &str) -> io::Result<Box<dyn FileSystem>>;
}

/// Provides [`OsFileSystem`]s under a download directory.
#[derive(Debug, Clone)]
pub struct OsFsProvider {
    download_dir: PathBuf,
}

impl OsFsProvider {
    /// Create a provider rooted at `download_dir`.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }
}

impl Default for OsFsProvider {
    /// Root at the configured download directory.
    fn default() -> Self {
        Self::new(config::get().download_dir.clone())
    }
}

impl FsProvider for OsFsProvider {
    fn new_fs(&self, directory: &str) -> io::Result<Box<dyn FileSystem>> {
        validate_component(directory)?;
        Ok(Box::new(OsFileSystem::new(self.download_dir.join(directory))))
    }
}

/// Provides [`MemFileSystem`]s, one shared namespace per directory.
#[derive(Default)]
pub struct MemFsProvider {
    namespaces: Mutex<FxHashMap<String, MemFileSystem>>,
}

impl MemFsProvider {
    /// Create a new provider with no directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the file system for `directory` if one has been created.
    pub fn get(&self, directory: &str) -> Option<MemFileSystem> {
        self.namespaces.lock().get(directory).cloned()
    }
}

impl FsProvider for MemFsProvider {
    fn new_fs(&self, directory: &str) -> io::Result<Box<dyn FileSystem>> {
        validate_component(directory)?;
        let fs = self
            .namespaces
            .lock()
            .entry(directory.to_string())
            .or_default()
            .clone();
        Ok(Box::new(fs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_os_provider_nests_directory() {
        let dir = TempDir::new().unwrap();
        let provider = OsFsProvider::new(dir.path());

        let fs = provider.new_fs("my-torrent").unwrap();
        let file = fs.open(&["a.bin".into()], 1).unwrap();
        file.close().unwrap();
        assert!(dir.path().join("my-torrent").join("a.bin").exists());
    }

    #[test]
    fn test_os_provider_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let provider = OsFsProvider::new(dir.path());
        assert!(provider.new_fs("..").is_err());
    }

    #[test]
    fn test_mem_provider_shares_namespace() {
        let provider = MemFsProvider::new();
        let fs = provider.new_fs("t").unwrap();
        fs.open(&["f".into()], 3).unwrap().close().unwrap();

        let again = provider.get("t").unwrap();
        assert!(again.contains("f"));
        assert!(provider.get("other").is_none());
    }
}
