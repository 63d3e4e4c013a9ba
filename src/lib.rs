//! `ngrex`: a two-stage N-gram inverted-index code search tool.
//!
//! `mk-index` walks one or more roots and builds a persistent inverted
//! N-gram index; `search` loads such an index, decomposes a query into
//! overlapping N-grams, intersects their posting lists down to a small
//! candidate set, and verifies each candidate with a literal matcher.
//!
//! See `engine::IndexEngine` for the facade tying the pieces together.

pub mod engine;
pub mod error;
pub mod format;
pub mod hits;
pub mod logging;
pub mod matcher;
pub mod ngram;
pub mod pathtable;
pub mod postingindex;
pub mod walk;
