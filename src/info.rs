//! Declared file layout of a torrent.

use std::borrow::Cow;

/// One file declared in a torrent's info dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredFile {
    /// Length in bytes.
    pub length: u64,
    /// Path components relative to the torrent directory.
    pub path: Vec<String>,
    /// Optional MD5 checksum, hex encoded.
    pub md5sum: Option<String>,
}

impl DeclaredFile {
    /// Create a declared file without a checksum.
    pub fn new<I, S>(path: I, length: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            length,
            path: path.into_iter().map(Into::into).collect(),
            md5sum: None,
        }
    }

    /// Path components joined with `/`, for logs and errors.
    pub fn display_path(&self) -> String {
        self.path.join("/")
    }
}

/// The parts of a torrent's info dictionary that describe its storage.
///
/// Single-file torrents leave `files` empty and describe their only file with
/// `name` and `length`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorrentInfo {
    /// Torrent name. The file name for single-file torrents.
    pub name: String,
    /// Total length. Only meaningful for single-file torrents.
    pub length: u64,
    /// Optional MD5 checksum of the single file.
    pub md5sum: Option<String>,
    /// Declared files in order. Empty for single-file torrents.
    pub files: Vec<DeclaredFile>,
}

impl TorrentInfo {
    /// Describe a single-file torrent.
    pub fn single(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
            ..Self::default()
        }
    }

    /// Describe a multi-file torrent.
    pub fn multi(name: impl Into<String>, files: Vec<DeclaredFile>) -> Self {
        Self {
            name: name.into(),
            files,
            ..Self::default()
        }
    }

    /// The files backing the store, in declaration order.
    ///
    /// A single-file torrent is treated as a multi-file torrent with one
    /// entry named after the torrent.
    pub fn declared_files(&self) -> Cow<'_, [DeclaredFile]> {
        if self.files.is_empty() {
            Cow::Owned(vec![DeclaredFile {
                length: self.length,
                path: vec![self.name.clone()],
                md5sum: self.md5sum.clone(),
            }])
        } else {
            Cow::Borrowed(&self.files)
        }
    }

    /// Sum of all declared file lengths.
    pub fn total_length(&self) -> u64 {
        self.declared_files().iter().map(|f| f.length).sum()
    }
}
