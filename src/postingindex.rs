//! PostingIndex: NGram -> set of PathHandle.

use crate::ngram::NGram;
use crate::pathtable::PathHandle;
use std::collections::{HashMap, HashSet};

/// Maps each N-gram to the set of paths that contain it.
///
/// Backed by a plain `HashMap<NGram, HashSet<PathHandle>>`: lookup and
/// insert dominate ingest, so online ordering is never maintained.
/// Deterministic order is produced only at save time, via
/// [`PostingIndex::entries_sorted`].
#[derive(Default, Debug)]
pub struct PostingIndex {
    map: HashMap<NGram, HashSet<PathHandle>>,
}

impl PostingIndex {
    pub fn new() -> Self {
        PostingIndex {
            map: HashMap::new(),
        }
    }

    /// Idempotent: after the call, `ngram`'s set contains `handle`.
    pub fn insert(&mut self, ngram: NGram, handle: PathHandle) {
        self.map.entry(ngram).or_default().insert(handle);
    }

    /// A borrowed view of the posting set for `ngram`, or `None` if the
    /// N-gram was never indexed.
    pub fn lookup(&self, ngram: &NGram) -> Option<&HashSet<PathHandle>> {
        self.map.get(ngram)
    }

    pub fn ngram_count(&self) -> usize {
        self.map.len()
    }

    /// Entries in ascending N-gram order, each with its handles sorted
    /// ascending — used only by the serializer to get byte-identical
    /// output regardless of hash-map iteration order.
    pub fn entries_sorted(&self) -> Vec<(&NGram, Vec<PathHandle>)> {
        let mut entries: Vec<(&NGram, Vec<PathHandle>)> = self
            .map
            .iter()
            .map(|(ngram, handles)| {
                let mut sorted: Vec<PathHandle> = handles.iter().copied().collect();
                sorted.sort_unstable();
                (ngram, sorted)
            })
            .collect();
        entries.sort_unstable_by_key(|(a, _)| (*a).clone());
        entries
    }
}
