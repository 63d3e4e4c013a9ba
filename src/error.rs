//! Error taxonomy: `thiserror` enums with `#[from]` conversions for
//! the underlying I/O causes.

use thiserror::Error;

/// Failures that can occur while loading a serialized index.
///
/// Load failures are total: on any of these, the engine releases all
/// partial state and reports the kind, never exposing a half-built
/// index.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("truncated index stream: {0}")]
    Truncated(&'static str),

    #[error("bad magic: expected {expected:02x?}, found {found:02x?}")]
    BadMagic { expected: [u8; 8], found: [u8; 8] },

    #[error("corrupt handle {handle} >= paths_len {paths_len}")]
    CorruptHandle { handle: u64, paths_len: u64 },

    #[error("io error while loading index")]
    Io(#[from] std::io::Error),
}

/// Failures while saving an index; I/O errors are the only cause.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("io error while saving index")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by the `search` query pipeline.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("query string of length {len} is shorter than N={n}")]
    QueryTooShort { len: usize, n: usize },

    #[error("failed to load index")]
    Load(#[from] LoadError),

    #[error("io error while verifying a candidate file")]
    Io(#[from] std::io::Error),
}
