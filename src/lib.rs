//! # torrent-store
//!
//! A flat, randomly addressable byte store over the files of a BitTorrent
//! torrent.
//!
//! Peers and pieces address torrent data by one flat offset into the
//! concatenation of all files. This crate maps those accesses onto the right
//! file at the right local offset, spanning file boundaries transparently:
//!
//! - **Offset index**: built once at open, binary-searched per access
//! - **Boundary rules**: reads past the end are zeros, writes past the end
//!   must be zeros (the padding of the final piece)
//! - **Cache plug-in**: an optional [`PieceCache`] serves and absorbs I/O
//!   before the files are touched
//! - **Commit**: verified pieces are written through to the files and
//!   reported back to the cache
//!
//! ## Quick Start
//!
//! ```ignore
//! use torrent_store::{DeclaredFile, OsFileSystem, TorrentInfo, VirtualStore};
//!
//! let info = TorrentInfo::multi("album", vec![
//!     DeclaredFile::new(["cd1", "01.flac"], 31_457_280),
//!     DeclaredFile::new(["cd1", "02.flac"], 28_311_552),
//! ]);
//! let fs = OsFileSystem::new("/var/lib/torrents/album");
//! let (store, total) = VirtualStore::open(&info, &fs)?;
//!
//! // Serve a block request that straddles both files
//! let mut block = vec![0u8; 16 * 1024];
//! store.read_at(&mut block, 31_457_280 - 100)?;
//!
//! store.close()?;
//! ```
//!
//! ## Modules
//!
//! - [`store`]: The virtual store itself
//! - [`file`]: File system and file handle traits, OS and in-memory implementations
//! - [`cache`]: Piece cache plug-in trait
//! - [`info`]: Declared file layout of a torrent
//! - [`config`]: Runtime configuration (download directory, preallocation)
//! - [`error`]: Error type

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod file;
pub mod info;
pub mod store;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
///
/// ```ignore
/// use torrent_store::prelude::*;
/// ```
///
/// This includes:
/// - Store: `VirtualStore`, `StoreError`
/// - Layout: `TorrentInfo`, `DeclaredFile`
/// - Collaborators: `FileSystem`, `StoreFile`, `FsProvider`, `PieceCache`
pub mod prelude {
    pub use crate::{
        CacheRange, DeclaredFile, FileSystem, FsProvider, PieceCache, ReadGap, StoreError,
        StoreFile, TorrentInfo, VirtualStore, WriteBack,
    };
}

// =============================================================================
// Store
// =============================================================================

pub use store::VirtualStore;

#[cfg(feature = "batch")]
pub use store::ReadRequest;

pub use error::{Result, StoreError};
pub use info::{DeclaredFile, TorrentInfo};

// =============================================================================
// Collaborators
// =============================================================================

pub use cache::{CacheRange, PieceCache, ReadGap, WriteBack};
pub use config::{Config, ConfigBuilder};
pub use file::{
    FileSystem, FsProvider, MemFileSystem, MemFsProvider, OsFileSystem, OsFsProvider, StoreFile,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use tempfile::TempDir;

    use super::*;

    fn sample_info() -> TorrentInfo {
        TorrentInfo::multi(
            "sample",
            vec![
                DeclaredFile::new(["a.bin"], 10),
                DeclaredFile::new(["nested", "b.bin"], 20),
                DeclaredFile::new(["empty.bin"], 0),
                DeclaredFile::new(["c.bin"], 7),
            ],
        )
    }

    #[test]
    fn test_on_disk_round_trip() {
        let dir = TempDir::new().unwrap();
        let provider = OsFsProvider::new(dir.path());
        let fs = provider.new_fs("sample").unwrap();

        let (store, total) = VirtualStore::open(&sample_info(), fs.as_ref()).unwrap();
        assert_eq!(total, 37);

        let data: Vec<u8> = (1..=37).collect();
        store.write_at(&data, 0).unwrap();
        store.close().unwrap();

        let root = dir.path().join("sample");
        assert_eq!(std::fs::read(root.join("a.bin")).unwrap(), &data[..10]);
        assert_eq!(std::fs::read(root.join("nested").join("b.bin")).unwrap(), &data[10..30]);
        assert!(std::fs::read(root.join("empty.bin")).unwrap().is_empty());

        let (store, _) = VirtualStore::open(&sample_info(), fs.as_ref()).unwrap();
        let mut buf = vec![0u8; 15];
        store.read_at(&mut buf, 5).unwrap();
        assert_eq!(buf, &data[5..20]);
    }

    #[test]
    fn test_concurrent_disjoint_writes() {
        let fs = MemFileSystem::new();
        let (store, total) = VirtualStore::open(&sample_info(), &fs).unwrap();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..total)
            .map(|off| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.write_at(&[off as u8 + 1], off).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut all = vec![0u8; total as usize];
        store.read_at(&mut all, 0).unwrap();
        assert_eq!(all, (1..=37).collect::<Vec<u8>>());
    }
}
