//! IndexEngine: the facade composing PathTable and PostingIndex.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::error::{LoadError, SearchError};
use crate::format;
use crate::hits;
use crate::matcher::Matcher;
use crate::ngram::{NGram, Window};
use crate::pathtable::{PathHandle, PathTable};
use crate::postingindex::PostingIndex;

/// Default verification read-buffer size.
pub const DEFAULT_VERIFY_BUFFER: usize = 4096;

/// Default N-gram length.
pub const DEFAULT_NGRAM_LEN: usize = 3;

#[derive(Debug)]
pub struct IndexEngine {
    ngram_len: usize,
    paths: PathTable,
    postings: PostingIndex,
}

impl IndexEngine {
    pub fn new(ngram_len: usize) -> Self {
        assert!(ngram_len >= 2, "invalid N-gram size, N must be at least 2");
        IndexEngine {
            ngram_len,
            paths: PathTable::new(),
            postings: PostingIndex::new(),
        }
    }

    pub fn ngram_len(&self) -> usize {
        self.ngram_len
    }

    pub fn path_table(&self) -> &PathTable {
        &self.paths
    }

    pub fn posting_index(&self) -> &PostingIndex {
        &self.postings
    }

    /// Ingests one file's bytes under `path_bytes`. Returns the
    /// count of N-grams inserted (windows emitted, not distinct).
    ///
    /// The path is appended to the table before any read happens, and
    /// is never rolled back on a short or empty file — an orphan path
    /// with no postings is harmless, since no query can ever reach it.
    pub fn ingest<R: Read>(&mut self, mut reader: R, path_bytes: &[u8]) -> std::io::Result<u64> {
        let handle = self.paths.append_path(path_bytes);

        let mut window = Window::new(self.ngram_len);
        let mut count: u64 = 0;
        let mut chunk = vec![0u8; DEFAULT_VERIFY_BUFFER];

        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if let Some(ngram) = window.push(byte) {
                    self.postings.insert(ngram, handle);
                    count += 1;
                }
            }
        }

        Ok(count)
    }

    /// Serializes the engine to `sink`, byte-exact and deterministic.
    pub fn save<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        format::save(&self.paths, &self.postings, sink)
    }

    /// Loads an engine from `source`, built for N-grams of length
    /// `ngram_len` (the on-disk format does not itself record N; see
    /// DESIGN.md for why `mk-index` and `search` must agree on it out
    /// of band).
    pub fn load<R: Read>(mut source: R, ngram_len: usize) -> Result<Self, LoadError> {
        let (paths, postings) = format::load(&mut source, ngram_len)?;
        Ok(IndexEngine {
            ngram_len,
            paths,
            postings,
        })
    }

    /// The query primitive: returns the posting set for the
    /// N-gram formed by `text`'s first `ngram_len` bytes, or `None` if
    /// `text` is shorter than N or the N-gram was never indexed.
    pub fn query(&self, text: &[u8]) -> Option<&std::collections::HashSet<PathHandle>> {
        if text.len() < self.ngram_len {
            return None;
        }
        let ngram = NGram::new(&text[..self.ngram_len]);
        self.postings.lookup(&ngram)
    }

    /// Decomposes `query` into overlapping N-grams and intersects
    /// their posting sets, returning surviving handles
    /// sorted ascending for deterministic output order.
    pub fn candidates(&self, query: &[u8]) -> Result<Vec<PathHandle>, SearchError> {
        if query.len() < self.ngram_len {
            return Err(SearchError::QueryTooShort {
                len: query.len(),
                n: self.ngram_len,
            });
        }

        let n = self.ngram_len;
        let mut alive: HashMap<PathHandle, bool> = HashMap::new();
        let mut alive_count = 0usize;
        let mut first = true;

        for i in 0..=(query.len() - n) {
            let window = &query[i..i + n];
            let ngram = NGram::new(window);
            let result = self.postings.lookup(&ngram);

            if first {
                if let Some(set) = result {
                    for &h in set {
                        alive.insert(h, true);
                    }
                    alive_count = alive.len();
                }
                first = false;
            } else {
                for (handle, is_alive) in alive.iter_mut() {
                    if *is_alive {
                        let still_present = result.is_some_and(|set| set.contains(handle));
                        if !still_present {
                            *is_alive = false;
                            alive_count -= 1;
                        }
                    }
                }
            }

            log::trace!(
                "ngram='{:?}' files={} intersection={}",
                ngram,
                result.map_or(0, |s| s.len()),
                alive_count
            );

            if alive_count == 0 {
                break;
            }
        }

        let mut survivors: Vec<PathHandle> = alive
            .into_iter()
            .filter(|(_, is_alive)| *is_alive)
            .map(|(handle, _)| handle)
            .collect();
        survivors.sort_unstable();
        Ok(survivors)
    }

    /// Runs the full search pipeline: intersection, then
    /// verification of every survivor against `matcher`, writing
    /// formatted hits to `sink`. Returns the total number of hits
    /// printed.
    ///
    /// A candidate file that fails to open or read is logged and
    /// skipped, the same local-recovery policy ingest uses;
    /// it does not abort the rest of the search.
    pub fn search<W: Write>(
        &self,
        query: &[u8],
        matcher: &dyn Matcher,
        buffer_size: usize,
        color: bool,
        sink: &mut W,
    ) -> Result<u64, SearchError> {
        let survivors = self.candidates(query)?;
        log::debug!(
            "{} candidate file(s) survived intersection",
            survivors.len()
        );

        let mut total_hits = 0u64;
        for handle in survivors {
            let path_bytes = self.paths.resolve_path(handle);
            match verify_one(&path_bytes, query, matcher, buffer_size, color, sink) {
                Ok(count) => total_hits += count,
                Err(e) => {
                    log::warn!(
                        "skipping candidate '{}': {}",
                        String::from_utf8_lossy(&path_bytes),
                        e
                    );
                }
            }
        }
        Ok(total_hits)
    }
}

/// Reconstructs a filesystem path from the raw bytes stored in the
/// PathTable. Paths are opaque bytes, not necessarily valid UTF-8 (a
/// legal filename on Unix), so this goes through `OsStr` rather than
/// `str`, mirroring `mk_index.rs::path_to_bytes` on the write side.
#[cfg(unix)]
fn bytes_to_path(path_bytes: &[u8]) -> std::path::PathBuf {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(path_bytes).into()
}

#[cfg(not(unix))]
fn bytes_to_path(path_bytes: &[u8]) -> std::path::PathBuf {
    String::from_utf8_lossy(path_bytes).into_owned().into()
}

/// Opens and scans one candidate file, carrying `query.len() - 1` bytes
/// of overlap between read buffers so matches straddling a chunk
/// boundary are never missed.
fn verify_one<W: Write>(
    path_bytes: &[u8],
    query: &[u8],
    matcher: &dyn Matcher,
    buffer_size: usize,
    color: bool,
    sink: &mut W,
) -> std::io::Result<u64> {
    let path = bytes_to_path(path_bytes);
    let mut file = std::fs::File::open(&path)?;

    let overlap_len = query.len().saturating_sub(1);
    let mut carry: Vec<u8> = Vec::new();
    let mut absolute_base: u64 = 0;
    let mut fresh = vec![0u8; buffer_size];
    let mut hit_count = 0u64;

    loop {
        let n = file.read(&mut fresh)?;
        if n == 0 {
            break;
        }

        let mut combined = carry.clone();
        combined.extend_from_slice(&fresh[..n]);

        let mut start = 0usize;
        while let Some((begin, end)) = matcher.find(&combined, start) {
            let ctx = hits::extract_line(&combined, begin, end);
            hits::write_hit(sink, path_bytes, absolute_base + begin as u64, &ctx, color)?;
            hit_count += 1;
            start = begin + 1;
        }

        let next_carry_len = overlap_len.min(combined.len());
        absolute_base += (combined.len() - next_carry_len) as u64;
        carry = combined[combined.len() - next_carry_len..].to_vec();
    }

    Ok(hit_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::LiteralMatcher;

    #[test]
    fn ingest_query_sanity_scenario_1() {
        let mut engine = IndexEngine::new(3);
        let count = engine.ingest(&b"abcabd"[..], b"/t/a").unwrap();
        assert_eq!(count, 4);

        for g in ["abc", "bca", "cab", "abd"] {
            let set = engine.query(g.as_bytes()).unwrap();
            assert_eq!(set.len(), 1);
        }
    }

    #[test]
    fn intersection_pruning_scenario_2() {
        let mut engine = IndexEngine::new(3);
        engine.ingest(&b"hello"[..], b"/x").unwrap();
        engine.ingest(&b"world"[..], b"/y").unwrap();

        let candidates = engine.candidates(b"hello").unwrap();
        assert_eq!(candidates.len(), 1);

        let none = engine.candidates(b"lorem").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn short_file_scenario_4() {
        let mut engine = IndexEngine::new(3);
        let count = engine.ingest(&b"ab"[..], b"/s").unwrap();
        assert_eq!(count, 0);
        assert_eq!(engine.posting_index().ngram_count(), 0);
        assert!(engine.query(b"ab").is_none());
    }

    #[test]
    fn query_too_short_is_rejected() {
        let engine = IndexEngine::new(3);
        let err = engine.candidates(b"ab").unwrap_err();
        assert!(matches!(err, SearchError::QueryTooShort { .. }));
    }

    #[test]
    fn search_end_to_end_over_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.txt");
        std::fs::write(&file_path, b"abcabd").unwrap();

        let mut engine = IndexEngine::new(3);
        engine
            .ingest(
                std::fs::File::open(&file_path).unwrap(),
                file_path.to_str().unwrap().as_bytes(),
            )
            .unwrap();

        let matcher = LiteralMatcher::new(b"abc");
        let mut out = Vec::new();
        let hits = engine
            .search(b"abc", &matcher, 4096, false, &mut out)
            .unwrap();
        assert_eq!(hits, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0+3"));
    }

    #[test]
    fn search_finds_matches_straddling_buffer_boundary() {
        // 4-byte needle "XYZW" placed so it straddles a deliberately
        // tiny 4-byte read buffer.
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("b.txt");
        let mut content = vec![b'a'; 6];
        content.extend_from_slice(b"XYZW");
        content.extend(vec![b'b'; 6]);
        std::fs::write(&file_path, &content).unwrap();

        let mut engine = IndexEngine::new(3);
        engine
            .ingest(
                std::fs::File::open(&file_path).unwrap(),
                file_path.to_str().unwrap().as_bytes(),
            )
            .unwrap();

        let matcher = LiteralMatcher::new(b"XYZW");
        let mut out = Vec::new();
        // buffer_size smaller than the file so the needle (offset 6..10)
        // definitely straddles a chunk boundary at a multiple of 4.
        let hits = engine
            .search(b"XYZW", &matcher, 4, false, &mut out)
            .unwrap();
        assert_eq!(hits, 1);
        assert!(String::from_utf8(out).unwrap().contains("6+4"));
    }
}
