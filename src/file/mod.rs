//! File system collaborators of the virtual store.
//!
//! The store never touches paths itself. It asks a [`FileSystem`] to open each
//! declared file and then talks to the returned [`StoreFile`] handles with
//! positioned reads and writes only:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    Handle Lifecycle                       │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │  FsProvider::new_fs(dir) ──► FileSystem                   │
//! │                                  │                        │
//! │                                  └─► open(path, length)   │
//! │                                          │                │
//! │                                          ▼                │
//! │                                  StoreFile (owned by the  │
//! │                                  store until close)       │
//! │                                                           │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Two implementations ship with the crate: [`OsFileSystem`] on top of the
//! real filesystem and [`MemFileSystem`] for tests and ephemeral torrents.

mod mem;
mod os;
mod provider;

use std::io;

pub use mem::{MemFile, MemFileSystem};
pub use os::{OsFile, OsFileSystem};
pub use provider::{FsProvider, MemFsProvider, OsFsProvider};

/// A random-access file handle.
///
/// Handles are shared between threads and must tolerate overlapping
/// concurrent `read_at` / `write_at` calls.
pub trait StoreFile: Send + Sync {
    /// Read into `buf` starting at `offset` within this file.
    ///
    /// May read fewer bytes than requested. `Ok(0)` means end of file.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Write `buf` starting at `offset` within this file.
    ///
    /// May write fewer bytes than requested.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;

    /// Close the handle, releasing its resources.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// A file system that opens the files of one torrent.
pub trait FileSystem: Send + Sync {
    /// Open (creating if needed) the file named by `name` with the declared `length`.
    fn open(&self, name: &[String], length: u64) -> io::Result<Box<dyn StoreFile>>;
}

/// Fill `buf` from `file` at `offset`, looping over short reads.
///
/// Returns the bytes read alongside the outcome so callers can report
/// partial progress on failure.
pub(crate) fn read_full_at(
    file: &dyn StoreFile,
    buf: &mut [u8],
    offset: u64,
) -> (usize, io::Result<()>) {
    let mut done = 0;
    while done < buf.len() {
        match file.read_at(&mut buf[done..], offset + done as u64) {
            Ok(0) => {
                return (
                    done,
                    Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "file ended before its declared length",
                    )),
                );
            }
            Ok(n) => done += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (done, Err(e)),
        }
    }
    (done, Ok(()))
}

/// Write all of `buf` to `file` at `offset`, looping over short writes.
pub(crate) fn write_full_at(
    file: &dyn StoreFile,
    buf: &[u8],
    offset: u64,
) -> (usize, io::Result<()>) {
    let mut done = 0;
    while done < buf.len() {
        match file.write_at(&buf[done..], offset + done as u64) {
            Ok(0) => {
                return (
                    done,
                    Err(io::Error::new(io::ErrorKind::WriteZero, "file accepted no bytes")),
                );
            }
            Ok(n) => done += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (done, Err(e)),
        }
    }
    (done, Ok(()))
}

/// Check one path component of a declared file.
///
/// Rejects anything that could escape the torrent directory.
pub(crate) fn validate_component(component: &str) -> io::Result<()> {
    let bad = component.is_empty()
        || component == "."
        || component == ".."
        || component.contains(['/', '\\', '\0']);
    if bad {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid path component: {component:?}"),
        ));
    }
    Ok(())
}

/// Validate every component of a declared path.
pub(crate) fn validate_path(name: &[String]) -> io::Result<()> {
    if name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    name.iter().try_for_each(|c| validate_component(c))
}
