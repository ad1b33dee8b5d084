//! Piece cache plug-in boundary.
//!
//! A cache sits in front of the files of a [`VirtualStore`](crate::VirtualStore).
//! The store hands it every read and write first and only touches the files
//! for the ranges the cache gives back:
//!
//! ```text
//! read_at(buf, off)
//!   └─► PieceCache::read_at ──► fills what it holds
//!                           └─► returns unfilled sub-slices of `buf`
//!                                 └─► raw read from files
//!
//! write_at(buf, off)
//!   └─► PieceCache::write_at ──► absorbs what it buffers
//!                            └─► returns ranges to persist
//!                                  └─► raw write to files
//! ```
//!
//! How the cache stores, evicts, or coalesces data is up to the implementation.

use std::io;
use std::ops::Range;

/// A buffer paired with the flat offset it belongs at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRange<B> {
    /// The bytes, or the space for them.
    pub data: B,
    /// Flat offset of `data[0]` in the store.
    pub offset: u64,
}

/// Part of a read the cache could not serve, borrowed from the caller's buffer.
pub type ReadGap<'a> = CacheRange<&'a mut [u8]>;

/// Bytes the cache did not absorb and that must be written to the files.
pub type WriteBack = CacheRange<Vec<u8>>;

impl<B> CacheRange<B> {
    /// Create a range.
    pub fn new(data: B, offset: u64) -> Self {
        Self { data, offset }
    }
}

/// Trait for a piece cache attached to a store.
///
/// Implementations are shared between threads and must serialize their own
/// state (buffers, commit bookkeeping) internally.
pub trait PieceCache: Send + Sync {
    /// Serve a read of `buf.len()` bytes at flat `offset`.
    ///
    /// Fill whatever the cache holds and return the parts of `buf` it could
    /// not fill. An empty result means the read was fully served.
    fn read_at<'a>(&self, buf: &'a mut [u8], offset: u64) -> Vec<ReadGap<'a>>;

    /// Accept a write of `buf` at flat `offset`.
    ///
    /// Return the ranges that must be persisted to the files now. An empty
    /// result means the cache absorbed everything.
    fn write_at(&self, buf: &[u8], offset: u64) -> Vec<WriteBack>;

    /// Record that `piece` is durably stored in the files.
    fn mark_committed(&self, piece: usize);

    /// Release the cache.
    fn close(&self) -> io::Result<()>;
}

/// Split `buf` into the read gaps named by `spans`.
///
/// `spans` are positions within `buf`; `offset` is the flat offset of
/// `buf[0]`. Helper for [`PieceCache::read_at`] implementations.
///
/// # Panics
///
/// Panics if `spans` are not sorted, overlap, or run past the end of `buf`.
///
/// # Example
///
/// ```
/// use torrent_store::cache::carve;
///
/// let mut buf = [0u8; 10];
/// let gaps = carve(&mut buf, 100, &[1..3, 6..10]);
/// assert_eq!(gaps.len(), 2);
/// assert_eq!(gaps[1].offset, 106);
/// assert_eq!(gaps[1].data.len(), 4);
/// ```
pub fn carve<'a>(buf: &'a mut [u8], offset: u64, spans: &[Range<usize>]) -> Vec<ReadGap<'a>> {
    let mut gaps = Vec::with_capacity(spans.len());
    let mut rest = buf;
    let mut consumed = 0;
    for span in spans {
        assert!(
            span.start >= consumed && span.start <= span.end,
            "read gaps must be sorted and disjoint"
        );
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(span.start - consumed);
        let (gap, tail) = tail.split_at_mut(span.end - span.start);
        gaps.push(CacheRange::new(gap, offset + span.start as u64));
        rest = tail;
        consumed = span.end;
    }
    gaps
}
