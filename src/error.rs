//! Store error type.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error type for virtual store operations.
///
/// I/O failures and protocol violations are separate variants so callers can
/// tell a broken disk from a peer sending garbage past the end of the data.
///
/// # Example
///
/// ```ignore
/// match store.write_at(&block, offset) {
///     Ok(n) => { /* all n bytes accepted */ }
///     Err(StoreError::NonZeroTrailingData { accepted, .. }) => {
///         // Drop the peer, it sent payload past the end of the torrent.
///     }
///     Err(e) => eprintln!("{e} after {} bytes", e.transferred()),
/// }
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// A declared file could not be opened during construction.
    #[error("failed to open '{path}': {source}")]
    Open {
        /// Joined path components of the declared file.
        path: String,
        /// Error reported by the filesystem.
        source: io::Error,
    },

    /// A file handle failed during a positioned read or write.
    #[error("I/O error at offset {offset} after {transferred} bytes: {source}")]
    Io {
        /// Flat offset of the chunk that failed.
        offset: u64,
        /// Bytes transferred before the failure.
        transferred: usize,
        /// Error reported by the handle.
        source: io::Error,
    },

    /// A write ran past the end of the store with payload that is not zero padding.
    #[error("unexpected non-zero data at end of store (offset {offset})")]
    NonZeroTrailingData {
        /// Flat offset of the first non-zero byte.
        offset: u64,
        /// Bytes accepted before the offending byte.
        accepted: usize,
    },

    /// The declared file lengths add up to more than a flat offset can address.
    #[error("declared files exceed the addressable size at '{path}'")]
    TooLarge {
        /// Joined path components of the first file that does not fit.
        path: String,
    },

    /// Closing a file handle failed.
    #[error("failed to close file: {0}")]
    Close(#[source] io::Error),

    /// Closing the attached cache failed.
    #[error("failed to close cache: {0}")]
    CacheClose(#[source] io::Error),
}

impl StoreError {
    /// Bytes transferred before the error occurred.
    ///
    /// Zero for errors that are not tied to a transfer.
    pub fn transferred(&self) -> usize {
        match self {
            Self::Io { transferred, .. } => *transferred,
            Self::NonZeroTrailingData { accepted, .. } => *accepted,
            _ => 0,
        }
    }

    /// Check if this error is a protocol violation rather than an I/O failure.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::NonZeroTrailingData { .. })
    }
}
