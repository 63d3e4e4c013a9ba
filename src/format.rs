//! The on-disk binary format, byte-exact and deterministic.
//!
//! Header (24 bytes), then the PathTable payload, then `ngram_count`
//! entries back to back. All multi-byte integers are little-endian,
//! read and written with `byteorder`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::LoadError;
use crate::ngram::NGram;
use crate::pathtable::PathTable;
use crate::postingindex::PostingIndex;

pub const MAGIC: [u8; 8] = [0xFF, 0x42, 0x55, 0x53, 0x4B, 0x30, 0x31, 0x1A];
pub const HEADER_LEN: usize = 24;

fn truncated(what: &'static str) -> LoadError {
    LoadError::Truncated(what)
}

fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), LoadError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            truncated(what)
        } else {
            LoadError::Io(e)
        }
    })
}

/// Serializes `paths` and `postings` to `sink`, entries ascending by
/// N-gram bytes, handles ascending numerically within each entry.
pub fn save<W: Write>(
    paths: &PathTable,
    postings: &PostingIndex,
    sink: &mut W,
) -> std::io::Result<()> {
    let entries = postings.entries_sorted();

    sink.write_all(&MAGIC)?;
    sink.write_u64::<LittleEndian>(entries.len() as u64)?;
    sink.write_u64::<LittleEndian>(paths.len() as u64)?;

    sink.write_all(paths.bytes())?;

    for (ngram, handles) in &entries {
        sink.write_u32::<LittleEndian>(handles.len() as u32)?;
        sink.write_all(ngram.as_bytes())?;
        for &handle in handles {
            sink.write_u64::<LittleEndian>(handle)?;
        }
    }

    Ok(())
}

/// Loads a PathTable and PostingIndex from `source`, validating every
/// field. On any failure no partial state is returned: the
/// caller gets only the error kind.
pub fn load<R: Read>(
    source: &mut R,
    ngram_len: usize,
) -> Result<(PathTable, PostingIndex), LoadError> {
    let mut header = [0u8; HEADER_LEN];
    read_exact_or_truncated(source, &mut header, "header")?;

    let mut found_magic = [0u8; 8];
    found_magic.copy_from_slice(&header[0..8]);
    if found_magic != MAGIC {
        return Err(LoadError::BadMagic {
            expected: MAGIC,
            found: found_magic,
        });
    }

    let ngram_count = u64::from_le_bytes(header[8..16].try_into().unwrap());
    let paths_len = u64::from_le_bytes(header[16..24].try_into().unwrap());

    // `paths_len` comes straight off the wire and is not trusted: read at
    // most that many bytes rather than pre-allocating a buffer of that
    // size, so a corrupt or truncated header claiming an enormous length
    // surfaces as `Truncated` instead of an OOM abort.
    let mut path_bytes = Vec::new();
    (&mut *source)
        .take(paths_len)
        .read_to_end(&mut path_bytes)
        .map_err(LoadError::Io)?;
    if path_bytes.len() as u64 != paths_len {
        return Err(truncated("path table payload"));
    }
    let paths = PathTable::from_bytes(path_bytes);

    let mut postings = PostingIndex::new();
    let mut ngram_buf = vec![0u8; ngram_len];
    for _ in 0..ngram_count {
        let posting_len = source
            .read_u32::<LittleEndian>()
            .map_err(|e| map_eof(e, "entry header"))?;

        read_exact_or_truncated(source, &mut ngram_buf, "entry ngram")?;
        let ngram = NGram::new(&ngram_buf);

        for _ in 0..posting_len {
            let handle = source
                .read_u64::<LittleEndian>()
                .map_err(|e| map_eof(e, "posting handle"))?;
            if handle >= paths_len {
                return Err(LoadError::CorruptHandle { handle, paths_len });
            }
            postings.insert(ngram.clone(), handle);
        }
    }

    Ok((paths, postings))
}

fn map_eof(e: std::io::Error, what: &'static str) -> LoadError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        truncated(what)
    } else {
        LoadError::Io(e)
    }
}
