//! The virtual store: one flat byte range over all files of a torrent.
//!
//! ```text
//! flat offset   0         4                10
//!               ├─────────┼─────────────────┤
//! files         │ a.txt 4 │    b.txt 6      │
//!               └─────────┴─────────────────┘
//! read_at(buf[3], 3) ──► a.txt[3..4] ++ b.txt[0..2]
//! ```
//!
//! Accesses go through three layers:
//!
//! - **Offset index** (`index`): locates the file owning a flat offset.
//! - **Raw accessor** (`raw`): walks the files a request spans and applies
//!   the end-of-store rules (reads past the end are zeros, writes past the end
//!   must be zeros).
//! - **Cache-aware accessor** (`cached`): consults an attached
//!   [`PieceCache`] first and falls through to raw access for what it misses.
//!
//! # Concurrency
//!
//! Reads, writes and commits take `&self` and may run from many threads at
//! once; the index is immutable after construction and is read without
//! locks. Handles and the cache must tolerate concurrent use themselves.

#[cfg(feature = "batch")]
mod batch;
mod cached;
mod index;
mod raw;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::PieceCache;
use crate::error::{Result, StoreError};
use crate::file::FileSystem;
use crate::info::TorrentInfo;

#[cfg(feature = "batch")]
pub use batch::ReadRequest;

use index::OffsetIndex;

/// A flat, randomly addressable byte store over the files of one torrent.
///
/// # Example
///
/// ```
/// use torrent_store::{DeclaredFile, MemFileSystem, TorrentInfo, VirtualStore};
///
/// let info = TorrentInfo::multi(
///     "demo",
///     vec![DeclaredFile::new(["a.txt"], 4), DeclaredFile::new(["b.txt"], 6)],
/// );
/// let fs = MemFileSystem::new();
/// let (store, total) = VirtualStore::open(&info, &fs)?;
/// assert_eq!(total, 10);
///
/// store.write_at(b"0123456789", 0)?;
/// let mut buf = [0u8; 3];
/// store.read_at(&mut buf, 3)?;
/// assert_eq!(&buf, b"345");
/// assert_eq!(fs.contents("b.txt").unwrap(), b"456789");
///
/// store.close()?;
/// # Ok::<(), torrent_store::StoreError>(())
/// ```
pub struct VirtualStore {
    index: OffsetIndex,
    cache: Option<Arc<dyn PieceCache>>,
}

impl VirtualStore {
    /// Open every file declared by `info` through `fs`.
    ///
    /// Returns the store and its total size. A torrent without a file list is
    /// stored as one file named after the torrent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if any file fails to open. Files opened
    /// before the failure are closed first.
    pub fn open<F>(info: &TorrentInfo, fs: &F) -> Result<(Self, u64)>
    where
        F: FileSystem + ?Sized,
    {
        let files = info.declared_files();
        let index = OffsetIndex::build(&files, fs)?;
        let total_size = index.total_size();
        debug!(
            name = %info.name,
            files = files.len(),
            total_size,
            "opened virtual store"
        );
        Ok((Self { index, cache: None }, total_size))
    }

    /// Attach a cache. Later reads, writes and commits go through it.
    ///
    /// Replaces any cache attached before without closing it.
    pub fn attach_cache(&mut self, cache: Arc<dyn PieceCache>) {
        self.cache = Some(cache);
    }

    /// Check if a cache is attached.
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Total size in bytes: the sum of all declared file lengths.
    pub fn total_size(&self) -> u64 {
        self.index.total_size()
    }

    /// Number of files backing the store.
    pub fn file_count(&self) -> usize {
        self.index.entries().len()
    }

    /// Flat start offset and length of the `index`-th file.
    pub fn file_span(&self, index: usize) -> Option<(u64, u64)> {
        self.index
            .entries()
            .get(index)
            .map(|entry| (entry.start, entry.length))
    }

    /// Close every file, then close and detach the cache.
    ///
    /// Every handle is closed even if some fail.
    ///
    /// # Errors
    ///
    /// Returns the first close failure: [`StoreError::Close`] for a file,
    /// [`StoreError::CacheClose`] for the cache.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let file_err = self.index.close_all();
        let cache_err = self.cache.take().and_then(|cache| {
            cache
                .close()
                .inspect_err(|e| warn!(error = %e, "failed to close cache"))
                .err()
        });
        debug!("closed virtual store");

        match (file_err, cache_err) {
            (Some(e), _) => Err(StoreError::Close(e)),
            (None, Some(e)) => Err(StoreError::CacheClose(e)),
            (None, None) => Ok(()),
        }
    }
}

impl Drop for VirtualStore {
    fn drop(&mut self) {
        // No-op after an explicit close: entries and cache are already gone.
        // Close failures were already logged by `shutdown`.
        let _ = self.shutdown();
    }
}
