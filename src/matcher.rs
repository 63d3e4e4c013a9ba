//! The `Matcher` abstraction: the literal-match engine used
//! during verification is an external collaborator specified only at
//! its interface. `ngrex` ships one concrete implementation so the
//! `search` binary is actually runnable.

use memchr::memmem::Finder;

/// A literal-substring search routine producing `(begin, end)` spans.
pub trait Matcher {
    /// Finds the next match in `haystack` at or after `start`, if any.
    fn find(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)>;
}

/// The reference matcher: plain literal substring search via
/// `memchr::memmem`.
pub struct LiteralMatcher {
    finder: Finder<'static>,
    needle_len: usize,
}

impl LiteralMatcher {
    pub fn new(needle: &[u8]) -> Self {
        LiteralMatcher {
            finder: Finder::new(needle).into_owned(),
            needle_len: needle.len(),
        }
    }
}

impl Matcher for LiteralMatcher {
    fn find(&self, haystack: &[u8], start: usize) -> Option<(usize, usize)> {
        if start > haystack.len() {
            return None;
        }
        self.finder
            .find(&haystack[start..])
            .map(|rel| (start + rel, start + rel + self.needle_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_match() {
        let m = LiteralMatcher::new(b"abc");
        assert_eq!(m.find(b"xxabcyy", 0), Some((2, 5)));
    }

    #[test]
    fn finds_overlapping_matches_by_advancing_one_byte() {
        let m = LiteralMatcher::new(b"aa");
        let first = m.find(b"aaaa", 0).unwrap();
        assert_eq!(first, (0, 2));
        let second = m.find(b"aaaa", first.0 + 1).unwrap();
        assert_eq!(second, (1, 3));
    }

    #[test]
    fn no_match_returns_none() {
        let m = LiteralMatcher::new(b"lorem");
        assert_eq!(m.find(b"hello world", 0), None);
    }
}
