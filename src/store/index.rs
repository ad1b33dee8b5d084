//! Offset index over the declared files.

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::file::{FileSystem, StoreFile};
use crate::info::DeclaredFile;

/// One declared file and its open handle.
pub(crate) struct FileEntry {
    /// Flat offset of the file's first byte.
    pub(crate) start: u64,
    pub(crate) length: u64,
    pub(crate) file: Box<dyn StoreFile>,
}

/// Files in declaration order, covering `[0, total_size)` without gaps.
pub(crate) struct OffsetIndex {
    entries: Vec<FileEntry>,
    total_size: u64,
}

impl OffsetIndex {
    /// Open every declared file in order.
    ///
    /// If any open fails, or the lengths overflow a flat `u64` offset, the
    /// handles opened so far are closed before the error is returned.
    pub(crate) fn build<F>(files: &[DeclaredFile], fs: &F) -> Result<Self>
    where
        F: FileSystem + ?Sized,
    {
        let mut entries: Vec<FileEntry> = Vec::with_capacity(files.len());
        let mut total_size = 0u64;

        for declared in files {
            let Some(end) = total_size.checked_add(declared.length) else {
                close_entries(&mut entries);
                return Err(StoreError::TooLarge {
                    path: declared.display_path(),
                });
            };
            match fs.open(&declared.path, declared.length) {
                Ok(file) => {
                    entries.push(FileEntry {
                        start: total_size,
                        length: declared.length,
                        file,
                    });
                    total_size = end;
                }
                Err(source) => {
                    let path = declared.display_path();
                    close_entries(&mut entries);
                    return Err(StoreError::Open { path, source });
                }
            }
        }

        Ok(Self { entries, total_size })
    }

    /// Index of the last entry starting at or before `offset`.
    ///
    /// Offsets past the end map to the last entry.
    pub(crate) fn find(&self, offset: u64) -> usize {
        self.entries
            .partition_point(|entry| entry.start <= offset)
            .saturating_sub(1)
    }

    pub(crate) fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub(crate) fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Close every handle, returning the first error.
    ///
    /// Entries are drained so a second call closes nothing.
    pub(crate) fn close_all(&mut self) -> Option<std::io::Error> {
        close_entries(&mut self.entries)
    }
}

fn close_entries(entries: &mut Vec<FileEntry>) -> Option<std::io::Error> {
    let mut first = None;
    for (i, entry) in entries.drain(..).enumerate() {
        if let Err(e) = entry.file.close() {
            warn!(file = i, error = %e, "failed to close file");
            first.get_or_insert(e);
        }
    }
    first
}
