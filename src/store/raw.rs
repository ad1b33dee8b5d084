//! Raw access straight to the files, bypassing any cache.
//!
//! Requests past the last file follow the BitTorrent rule for the padding of
//! the final piece: they read as zeros, and only zeros may be written there.

use super::VirtualStore;
use crate::error::{Result, StoreError};
use crate::file::{read_full_at, write_full_at};

/// Largest chunk that fits in the current entry.
#[inline]
fn clamp(remaining: usize, space: u64) -> usize {
    usize::try_from(space).map_or(remaining, |space| remaining.min(space))
}

impl VirtualStore {
    /// Fill `buf` from the files starting at flat `offset`.
    ///
    /// Bytes past the end of the last file read as zero. Returns `buf.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on the first handle failure. Bytes read
    /// before it stay in `buf`; their count is the error's
    /// [`transferred`](StoreError::transferred).
    pub fn raw_read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let entries = self.index.entries();
        let mut index = self.index.find(offset);
        let mut offset = offset;
        let mut filled = 0;

        while filled < buf.len() && index < entries.len() {
            let entry = &entries[index];
            let local = offset - entry.start;
            if local < entry.length {
                let chunk = clamp(buf.len() - filled, entry.length - local);
                let dst = &mut buf[filled..filled + chunk];
                let (n, res) = read_full_at(entry.file.as_ref(), dst, local);
                filled += n;
                if let Err(source) = res {
                    return Err(StoreError::Io {
                        offset: offset.saturating_add(n as u64),
                        transferred: filled,
                        source,
                    });
                }
                offset += n as u64;
            }
            index += 1;
        }

        buf[filled..].fill(0);
        Ok(buf.len())
    }

    /// Write `buf` to the files starting at flat `offset`.
    ///
    /// Bytes past the end of the last file are accepted only if they are zero.
    /// Returns `buf.len()`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] on the first handle failure.
    /// - [`StoreError::NonZeroTrailingData`] if a byte past the end is not
    ///   zero; `accepted` counts the bytes before it.
    pub fn raw_write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        let entries = self.index.entries();
        let mut index = self.index.find(offset);
        let mut offset = offset;
        let mut written = 0;

        while written < buf.len() && index < entries.len() {
            let entry = &entries[index];
            let local = offset - entry.start;
            if local < entry.length {
                let chunk = clamp(buf.len() - written, entry.length - local);
                let src = &buf[written..written + chunk];
                let (n, res) = write_full_at(entry.file.as_ref(), src, local);
                written += n;
                if let Err(source) = res {
                    return Err(StoreError::Io {
                        offset: offset.saturating_add(n as u64),
                        transferred: written,
                        source,
                    });
                }
                offset += n as u64;
            }
            index += 1;
        }

        if let Some(pos) = buf[written..].iter().position(|&b| b != 0) {
            return Err(StoreError::NonZeroTrailingData {
                offset: offset.saturating_add(pos as u64),
                accepted: written + pos,
            });
        }
        Ok(buf.len())
    }
}
