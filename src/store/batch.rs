//! Parallel batch reads.
//!
//! Serving many block requests at once (e.g. a burst of peer requests or a
//! full recheck) fans the reads out over the rayon pool. Each request is an
//! independent [`VirtualStore::read_at`].

use rayon::prelude::*;

use super::VirtualStore;
use crate::error::Result;

/// One read in a batch: where to read and the buffer to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Flat offset to read at.
    pub offset: u64,
    /// Destination buffer; its length is the read length.
    pub buf: Vec<u8>,
}

impl ReadRequest {
    /// Create a request for `len` bytes at `offset`.
    pub fn new(offset: u64, len: usize) -> Self {
        Self {
            offset,
            buf: vec![0; len],
        }
    }
}

impl VirtualStore {
    /// Perform every request in parallel.
    ///
    /// Returns one result per request, in order. A failed request does not
    /// affect the others.
    pub fn read_batch(&self, requests: &mut [ReadRequest]) -> Vec<Result<usize>> {
        requests
            .par_iter_mut()
            .map(|req| self.read_at(&mut req.buf, req.offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::info::{DeclaredFile, TorrentInfo};
    use crate::store::testing::{CountingFs, ScriptedCache};

    fn info() -> TorrentInfo {
        TorrentInfo::multi(
            "t",
            (0..8).map(|i| DeclaredFile::new([format!("f{i}")], 1000 + i * 37)).collect(),
        )
    }

    #[test]
    fn test_batch_matches_sequential() {
        let fs = CountingFs::new();
        let (store, total) = VirtualStore::open(&info(), &fs).unwrap();
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        store.write_at(&data, 0).unwrap();

        let mut requests: Vec<ReadRequest> = (0..64)
            .map(|i| ReadRequest::new(i * 131, 500))
            .collect();
        let results = store.read_batch(&mut requests);

        assert_eq!(results.len(), 64);
        for (req, res) in requests.iter().zip(results) {
            assert_eq!(res.unwrap(), 500);
            let start = req.offset as usize;
            let end = (start + 500).min(data.len());
            assert_eq!(&req.buf[..end - start], &data[start..end]);
            assert!(req.buf[end - start..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_batch_isolates_failures() {
        let fs = CountingFs::new().fail_io_on("f1");
        let (mut store, _) = VirtualStore::open(&info(), &fs).unwrap();
        store.attach_cache(Arc::new(ScriptedCache::default()));

        let mut requests = vec![ReadRequest::new(0, 10), ReadRequest::new(1005, 10)];
        let results = store.read_batch(&mut requests);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
