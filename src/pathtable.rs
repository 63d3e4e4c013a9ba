//! The PathTable: an append-only byte arena of zero-terminated paths.
//!
//! Identity of a stored path is its byte offset into the arena (a
//! [`PathHandle`]). This arena never deduplicates or compresses common
//! prefixes: handle identity is tied to a concrete byte offset, and
//! introducing path compression would break that identity across
//! saves.

/// An offset into the PathTable, identifying one stored path.
pub type PathHandle = u64;

/// Append-only arena of zero-terminated byte strings.
#[derive(Default, Clone, Debug)]
pub struct PathTable {
    bytes: Vec<u8>,
}

impl PathTable {
    pub fn new() -> Self {
        PathTable { bytes: Vec::new() }
    }

    /// Wraps an already-valid zero-terminated byte arena, as produced
    /// by a prior `bytes()` call or loaded from disk.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        PathTable { bytes }
    }

    /// Appends `path` followed by a single `0x00`, returning the offset
    /// of its first byte. Never deduplicates.
    pub fn append_path(&mut self, path: &[u8]) -> PathHandle {
        let handle = self.bytes.len() as PathHandle;
        self.bytes.extend_from_slice(path);
        self.bytes.push(0);
        handle
    }

    /// Length of the stored path at `handle`, excluding its terminator.
    /// An out-of-range handle resolves to length 0.
    pub fn resolve_len(&self, handle: PathHandle) -> usize {
        let start = handle as usize;
        if start >= self.bytes.len() {
            return 0;
        }
        self.bytes[start..]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len() - start)
    }

    /// Copies up to `out.len()` path bytes into `out`, returning the
    /// number of bytes written (excluding the terminator). If `out` is
    /// strictly longer than the path, a trailing `0x00` is appended
    /// right after the copied bytes.
    pub fn resolve(&self, handle: PathHandle, out: &mut [u8]) -> usize {
        let len = self.resolve_len(handle);
        let start = (handle as usize).min(self.bytes.len());
        let to_copy = len.min(out.len());
        out[..to_copy].copy_from_slice(&self.bytes[start..start + to_copy]);
        if out.len() > len {
            out[len] = 0;
        }
        to_copy
    }

    /// Resolves a handle to an owned byte vector (convenience over
    /// `resolve`, used by the query/verification path). An out-of-range
    /// handle resolves to an empty vector.
    pub fn resolve_path(&self, handle: PathHandle) -> Vec<u8> {
        let len = self.resolve_len(handle);
        let start = (handle as usize).min(self.bytes.len());
        self.bytes[start..start + len].to_vec()
    }

    /// Whether `handle` points at a valid path's first byte.
    pub fn is_valid_handle(&self, handle: PathHandle) -> bool {
        (handle as usize) < self.bytes.len()
    }

    /// The full backing byte view, for bulk serialization.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_resolve_round_trip() {
        let mut table = PathTable::new();
        let a = table.append_path(b"/t/a");
        let b = table.append_path(b"/t/b");
        assert_eq!(a, 0);
        assert_eq!(b, 5); // "/t/a" + terminator = 5 bytes

        assert_eq!(table.resolve_len(a), 4);
        assert_eq!(table.resolve_path(a), b"/t/a");
        assert_eq!(table.resolve_path(b), b"/t/b");
    }

    #[test]
    fn no_deduplication() {
        let mut table = PathTable::new();
        let a = table.append_path(b"/same");
        let b = table.append_path(b"/same");
        assert_ne!(a, b);
    }

    #[test]
    fn out_of_range_handle_resolves_empty() {
        let table = PathTable::new();
        assert_eq!(table.resolve_len(999), 0);
        assert!(!table.is_valid_handle(999));
        assert_eq!(table.resolve_path(999), Vec::<u8>::new());
    }

    #[test]
    fn out_of_range_handle_does_not_panic_on_resolve() {
        let mut table = PathTable::new();
        table.append_path(b"hi");
        let mut buf = [0xAAu8; 8];
        let written = table.resolve(999, &mut buf);
        assert_eq!(written, 0);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn resolve_into_oversized_buffer_does_not_overrun() {
        let mut table = PathTable::new();
        let h = table.append_path(b"hi");
        let mut buf = [0xAAu8; 8];
        let written = table.resolve(h, &mut buf);
        assert_eq!(written, 2);
        assert_eq!(&buf[..2], b"hi");
        assert_eq!(buf[2], 0, "oversized buffer must be terminated");
        assert_eq!(&buf[3..], [0xAA; 5]);
    }

    #[test]
    fn resolve_into_exact_size_buffer_appends_no_terminator() {
        let mut table = PathTable::new();
        let h = table.append_path(b"hi");
        let mut buf = [0xAAu8; 2];
        let written = table.resolve(h, &mut buf);
        assert_eq!(written, 2);
        assert_eq!(&buf, b"hi");
    }
}
