//! Classic offset / hex / ASCII dump.
//!
//! Layout of one line (16 bytes per line):
//! ```text
//! 00000000  47 45 54 20 2f 20 48 54  54 50 2f 31 2e 31 0d 0a  |GET / HTTP/1.1..|
//! ^offset   ^first 8 bytes           ^last 8 bytes             ^ASCII gutter
//! ```
//! The final line of a dump that is not a multiple of 16 bytes is padded with
//! spaces so the ASCII gutter stays aligned with the lines above it.

use std::fmt::Write;

/// Bytes rendered per dump line.
pub const BYTES_PER_LINE: usize = 16;

/// Renders `data` as a hex dump.  Every line, including the last, ends in
/// `\n`.  An empty slice renders as an empty string.
///
/// # Examples
///
/// ```rust
/// use relay_core::hex_dump;
///
/// let dump = hex_dump(b"AB");
/// assert!(dump.starts_with("00000000  41 42 "));
/// assert!(dump.ends_with("|AB|\n"));
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let lines = data.len().div_ceil(BYTES_PER_LINE);
    // 79 characters per full line including the newline.
    let mut out = String::with_capacity(lines * 79);

    for (index, line) in data.chunks(BYTES_PER_LINE).enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{:08x}  ", index * BYTES_PER_LINE);

        for column in 0..BYTES_PER_LINE {
            match line.get(column) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
            if column == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        out.extend(line.iter().map(|&b| printable(b)));
        out.push_str("|\n");
    }

    out
}

/// Maps a byte to its ASCII-gutter character.
fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}
