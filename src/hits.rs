//! Hit line extraction and formatting.
//!
//! `PATH:BYTE_OFFSET+MATCH_LEN: LINE_WITH_MATCH`, where `LINE_WITH_MATCH`
//! is the current buffered line bounded at both ends by the nearest
//! newline, zero byte, or buffer edge, with non-printable bytes
//! escaped as `\xHH`, literal `\n` as `\n`, and backslash as `\\`.

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// The line containing a match, sliced out of the buffer that produced
/// it, together with where the match falls inside that line.
pub struct LineContext<'a> {
    pub line: &'a [u8],
    pub match_start_in_line: usize,
    pub match_len: usize,
}

/// Finds the bounding line for a match at `[match_begin, match_end)`
/// within `buffer`, scanning outward for the nearest `\n`, `\0`, or
/// buffer edge.
pub fn extract_line(buffer: &[u8], match_begin: usize, match_end: usize) -> LineContext<'_> {
    let line_start = buffer[..match_begin]
        .iter()
        .rposition(|&b| b == b'\n' || b == 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let line_end = buffer[match_end..]
        .iter()
        .position(|&b| b == b'\n' || b == 0)
        .map(|pos| match_end + pos)
        .unwrap_or(buffer.len());

    LineContext {
        line: &buffer[line_start..line_end],
        match_start_in_line: match_begin - line_start,
        match_len: match_end - match_begin,
    }
}

fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02X}", b)),
        }
    }
    out
}

/// Writes one formatted hit line to `sink`.
pub fn write_hit<W: Write>(
    sink: &mut W,
    path: &[u8],
    abs_offset: u64,
    ctx: &LineContext<'_>,
    color: bool,
) -> io::Result<()> {
    let path_str = String::from_utf8_lossy(path);
    let before = escape(&ctx.line[..ctx.match_start_in_line]);
    let matched =
        escape(&ctx.line[ctx.match_start_in_line..ctx.match_start_in_line + ctx.match_len]);
    let after = escape(&ctx.line[ctx.match_start_in_line + ctx.match_len..]);

    if color {
        writeln!(
            sink,
            "{}{}{}{}{}{}{}{}{}",
            path_str.magenta(),
            ":".dimmed(),
            abs_offset.to_string().yellow(),
            "+".dimmed(),
            ctx.match_len.to_string().yellow(),
            ": ".dimmed(),
            before,
            matched.red().bold(),
            after,
        )
    } else {
        writeln!(
            sink,
            "{}:{}+{}: {}{}{}",
            path_str, abs_offset, ctx.match_len, before, matched, after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_line_bounded_by_newlines() {
        let buf = b"first\nhello world\nthird";
        let ctx = extract_line(buf, 6, 11); // "hello" inside the middle line
        assert_eq!(ctx.line, b"hello world");
        assert_eq!(ctx.match_start_in_line, 0);
    }

    #[test]
    fn extracts_line_bounded_by_buffer_edges() {
        let buf = b"hello world";
        let ctx = extract_line(buf, 6, 11);
        assert_eq!(ctx.line, b"hello world");
        assert_eq!(ctx.match_start_in_line, 6);
    }

    #[test]
    fn zero_byte_bounds_a_line_like_newline() {
        let buf = b"bin\0hello\0more";
        let ctx = extract_line(buf, 4, 9);
        assert_eq!(ctx.line, b"hello");
    }

    #[test]
    fn writes_plain_hit_line() {
        let buf = b"prefix hello suffix";
        let ctx = extract_line(buf, 7, 12);
        let mut out = Vec::new();
        write_hit(&mut out, b"/t/a", 100, &ctx, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/t/a:100+5: prefix hello suffix\n"
        );
    }

    #[test]
    fn escapes_non_printable_bytes() {
        let buf = &[b'a', b'b', 0x01, b'c'][..];
        let ctx = extract_line(buf, 2, 3);
        let mut out = Vec::new();
        write_hit(&mut out, b"/t/a", 0, &ctx, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/t/a:0+1: ab\\x01c\n");
    }
}
