//! Cache-aware access and piece commit.

use tracing::{error, warn};

use super::VirtualStore;
use crate::cache::CacheRange;
use crate::error::Result;

impl VirtualStore {
    /// Read `buf.len()` bytes at flat `offset`.
    ///
    /// Without a cache this is [`raw_read_at`](Self::raw_read_at). With one,
    /// the cache serves what it holds and the rest is read from the files.
    /// Every unfulfilled range is attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the last error from the fallback reads.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let Some(cache) = &self.cache else {
            return self.raw_read_at(buf, offset);
        };

        let len = buf.len();
        let mut last_err = None;
        for CacheRange { data, offset } in cache.read_at(buf, offset) {
            let gap_len = data.len();
            if let Err(e) = self.raw_read_at(data, offset) {
                warn!(offset, len = gap_len, error = %e, "read from files failed");
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(len),
        }
    }

    /// Write `buf` at flat `offset`.
    ///
    /// Without a cache this is [`raw_write_at`](Self::raw_write_at) and its
    /// errors are returned. With one, the cache absorbs what it buffers and
    /// the ranges it hands back are written to the files.
    ///
    /// With a cache attached this always reports success: failures writing
    /// the handed-back ranges are logged, not returned, unlike
    /// [`read_at`](Self::read_at) which surfaces its fallback errors.
    pub fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize> {
        let Some(cache) = &self.cache else {
            return self.raw_write_at(buf, offset);
        };

        for range in cache.write_at(buf, offset) {
            if let Err(e) = self.raw_write_at(&range.data, range.offset) {
                warn!(
                    offset = range.offset,
                    len = range.data.len(),
                    error = %e,
                    "write-back to files failed"
                );
            }
        }
        Ok(buf.len())
    }

    /// Persist a verified piece held by the cache and tell the cache it is stored.
    ///
    /// Writes `piece_data` at flat `offset` directly to the files, then calls
    /// [`PieceCache::mark_committed`](crate::cache::PieceCache::mark_committed)
    /// once. Does nothing without a cache.
    ///
    /// # Panics
    ///
    /// Panics if the write fails. The cache may already have dropped its copy
    /// of the piece, so the data would be lost.
    pub fn commit(&self, piece: usize, piece_data: &[u8], offset: u64) {
        let Some(cache) = &self.cache else {
            return;
        };

        if let Err(e) = self.raw_write_at(piece_data, offset) {
            error!(piece, offset, error = %e, "error committing piece to storage");
            panic!("error committing piece {piece} to storage: {e}");
        }
        cache.mark_committed(piece);
    }
}
