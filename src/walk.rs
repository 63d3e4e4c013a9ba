//! The external walker: the core consumes a sequence of
//! `(file_handle, path_bytes)` pairs from here and does not itself
//! decide symlink, hidden-file, or cycle policy.
//!
//! Built on `jwalk`: symlinks never followed, entries sorted for
//! reproducible ingest order across runs over the same tree.

use jwalk::WalkDir;
use std::fs::File;
use std::path::PathBuf;

/// One file discovered under a root, ready for `IndexEngine::ingest`.
pub struct WalkEntry {
    pub file: File,
    pub path: PathBuf,
}

/// Walks every root in `roots` lazily, yielding every regular file
/// found one at a time (so `mk-index` never holds more than one open
/// file handle from the walk at once). A root that is itself a plain
/// file is yielded directly. Entries that cannot be stat'd, opened, or
/// that are not regular files are logged and skipped with a warning,
/// not fatal — they never abort the walk.
pub fn walk_roots(roots: Vec<PathBuf>) -> impl Iterator<Item = WalkEntry> {
    roots.into_iter().flat_map(walk_one_root)
}

fn walk_one_root(root: PathBuf) -> Box<dyn Iterator<Item = WalkEntry>> {
    let metadata = match std::fs::symlink_metadata(&root) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("cannot stat '{}': {}", root.display(), e);
            return Box::new(std::iter::empty());
        }
    };

    if metadata.is_file() {
        return Box::new(open_entry(root).into_iter());
    }

    let root_display = root.display().to_string();
    let iter = WalkDir::new(&root)
        .follow_links(false)
        .sort(true)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("walk error under '{}': {}", root_display, e);
                None
            }
        })
        .filter(|entry| match entry.metadata() {
            Ok(meta) => meta.is_file(),
            Err(e) => {
                log::warn!("cannot stat '{}': {}", entry.path().display(), e);
                false
            }
        })
        .filter_map(|entry| open_entry(entry.path()));

    Box::new(iter)
}

fn open_entry(path: PathBuf) -> Option<WalkEntry> {
    match File::open(&path) {
        Ok(file) => Some(WalkEntry { file, path }),
        Err(e) => {
            log::warn!("cannot open '{}': {}", path.display(), e);
            None
        }
    }
}
