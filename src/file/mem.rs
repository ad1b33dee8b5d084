//! In-memory file system.

use std::io;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use super::{FileSystem, StoreFile, validate_path};

type Contents = Arc<RwLock<Vec<u8>>>;

/// A file system that keeps every file in memory.
///
/// Clones share the same namespace, so data written through one store is
/// visible after the torrent is reopened.
///
/// # Example
///
/// ```
/// use torrent_store::file::{FileSystem, MemFileSystem, StoreFile};
///
/// let fs = MemFileSystem::new();
/// let file = fs.open(&["a.txt".to_string()], 4).unwrap();
/// file.write_at(b"hi", 1).unwrap();
/// assert_eq!(fs.contents("a.txt").unwrap(), b"\0hi\0");
/// ```
#[derive(Default, Clone)]
pub struct MemFileSystem {
    files: Arc<Mutex<FxHashMap<String, Contents>>>,
}

impl MemFileSystem {
    /// Create a new empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the contents of a file by its `/`-joined path.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(path).map(|data| data.read().clone())
    }

    /// Check if a file exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl FileSystem for MemFileSystem {
    fn open(&self, name: &[String], length: u64) -> io::Result<Box<dyn StoreFile>> {
        validate_path(name)?;
        let len = usize::try_from(length)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "file too large for memory"))?;

        let data = Arc::clone(self.files.lock().entry(name.join("/")).or_default());
        {
            let mut bytes = data.write();
            if bytes.len() < len {
                bytes.resize(len, 0);
            }
        }
        Ok(Box::new(MemFile { data }))
    }
}

/// A handle to an in-memory file.
pub struct MemFile {
    data: Contents,
}

impl StoreFile for MemFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.data.read();
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start + buf.len();
        let mut data = self.data.write();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}
