//! Operator-facing rendering of raw bytes

use std::fmt;

/// Displays bytes as a byte-string literal: `b'ok\x00\xff'`
///
/// Quoted with `'` unless the data holds a `'` and no `"`, in which case `"`
/// is used. Printable ASCII is shown as-is; the chosen quote, backslash and
/// everything else are escaped.
pub struct ByteRepr<'a>(pub &'a [u8]);

impl fmt::Display for ByteRepr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = if self.0.contains(&b'\'') && !self.0.contains(&b'"') {
            b'"'
        } else {
            b'\''
        };

        write!(f, "b{}", quote as char)?;
        for &b in self.0 {
            match b {
                b'\\' => f.write_str("\\\\")?,
                b'\t' => f.write_str("\\t")?,
                b'\n' => f.write_str("\\n")?,
                b'\r' => f.write_str("\\r")?,
                _ if b == quote => write!(f, "\\{}", b as char)?,
                0x20..=0x7e => write!(f, "{}", b as char)?,
                _ => write!(f, "\\x{:02x}", b)?,
            }
        }
        write!(f, "{}", quote as char)
    }
}

/// Space-separated uppercase hex, for debug logs
pub fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
