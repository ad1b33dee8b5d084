//! Fakes for store tests: a counting in-memory file system with fault
//! injection and a scripted cache.

use std::io;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::cache::{CacheRange, PieceCache, ReadGap, WriteBack, carve};
use crate::file::{FileSystem, MemFileSystem, StoreFile};

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// In-memory file system that counts opens and closes and can inject faults.
#[derive(Clone, Default)]
pub(crate) struct CountingFs {
    inner: MemFileSystem,
    counters: Arc<Counters>,
    fail_open_at: Option<usize>,
    fail_io_file: Option<String>,
    fail_close_file: Option<String>,
    unbacked: bool,
}

impl CountingFs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make the `k`-th open (0-indexed) fail.
    pub(crate) fn fail_open_at(mut self, k: usize) -> Self {
        self.fail_open_at = Some(k);
        self
    }

    /// Make every read and write on the file named `path` fail.
    pub(crate) fn fail_io_on(mut self, path: &str) -> Self {
        self.fail_io_file = Some(path.to_string());
        self
    }

    /// Make closing the file named `path` fail. It still counts as closed.
    pub(crate) fn fail_close_on(mut self, path: &str) -> Self {
        self.fail_close_file = Some(path.to_string());
        self
    }

    /// Open files without allocating their declared length.
    pub(crate) fn unbacked(mut self) -> Self {
        self.unbacked = true;
        self
    }

    pub(crate) fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn contents(&self, path: &str) -> Vec<u8> {
        self.inner.contents(path).unwrap_or_default()
    }
}

impl FileSystem for CountingFs {
    fn open(&self, name: &[String], length: u64) -> io::Result<Box<dyn StoreFile>> {
        if self.fail_open_at == Some(self.opened()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "injected open failure"));
        }
        let inner = self.inner.open(name, if self.unbacked { 0 } else { length })?;
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let path = name.join("/");
        Ok(Box::new(CountingFile {
            inner,
            counters: Arc::clone(&self.counters),
            fail_io: self.fail_io_file.as_deref() == Some(path.as_str()),
            fail_close: self.fail_close_file.as_deref() == Some(path.as_str()),
        }))
    }
}

struct CountingFile {
    inner: Box<dyn StoreFile>,
    counters: Arc<Counters>,
    fail_io: bool,
    fail_close: bool,
}

impl StoreFile for CountingFile {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if self.fail_io {
            return Err(io::Error::other("injected read failure"));
        }
        self.inner.read_at(buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        if self.fail_io {
            return Err(io::Error::other("injected write failure"));
        }
        self.inner.write_at(buf, offset)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.close()?;
        if self.fail_close {
            return Err(io::Error::other("injected close failure"));
        }
        Ok(())
    }
}

/// Cache that serves a fixed flat range from memory and records every call.
#[derive(Default)]
pub(crate) struct ScriptedCache {
    /// Flat range the cache holds, and its bytes.
    pub(crate) held: Option<(Range<u64>, Vec<u8>)>,
    /// When set, writes are absorbed instead of handed back.
    pub(crate) absorb_writes: bool,
    /// When set, `close` fails after counting the call.
    pub(crate) fail_close: bool,
    pub(crate) writes: Mutex<Vec<(u64, Vec<u8>)>>,
    pub(crate) committed: Mutex<Vec<usize>>,
    pub(crate) closed: AtomicUsize,
}

impl ScriptedCache {
    pub(crate) fn holding(start: u64, bytes: Vec<u8>) -> Self {
        let end = start + bytes.len() as u64;
        Self {
            held: Some((start..end, bytes)),
            ..Self::default()
        }
    }
}

impl PieceCache for ScriptedCache {
    fn read_at<'a>(&self, buf: &'a mut [u8], offset: u64) -> Vec<ReadGap<'a>> {
        let len = buf.len();
        let Some((held, bytes)) = &self.held else {
            return vec![CacheRange::new(buf, offset)];
        };

        let end = offset + len as u64;
        let lo = held.start.clamp(offset, end);
        let hi = held.end.clamp(offset, end);
        if lo >= hi {
            return vec![CacheRange::new(buf, offset)];
        }

        let (a, b) = ((lo - offset) as usize, (hi - offset) as usize);
        let src = (lo - held.start) as usize;
        buf[a..b].copy_from_slice(&bytes[src..src + (b - a)]);

        let spans: Vec<Range<usize>> = [0..a, b..len]
            .into_iter()
            .filter(|r| !r.is_empty())
            .collect();
        carve(buf, offset, &spans)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> Vec<WriteBack> {
        self.writes.lock().push((offset, buf.to_vec()));
        if self.absorb_writes {
            Vec::new()
        } else {
            vec![CacheRange::new(buf.to_vec(), offset)]
        }
    }

    fn mark_committed(&self, piece: usize) {
        self.committed.lock().push(piece);
    }

    fn close(&self) -> io::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(io::Error::other("injected cache close failure"));
        }
        Ok(())
    }
}
