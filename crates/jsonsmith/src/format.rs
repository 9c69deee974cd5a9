//! Number and string emit helpers called by generated marshal code.

use core::fmt::{self, Write as _};

use crate::buffer::EncodingBuffer;

/// Reusable digit scratch for [`format_bits`].
///
/// Generated routines declare one scratch local and thread it through every
/// integer field write, so no integer format allocates.
#[derive(Debug)]
pub struct FormatBitsScratch {
    digits: [u8; 20],
}

impl Default for FormatBitsScratch {
    fn default() -> Self {
        Self { digits: [0; 20] }
    }
}

/// Writes `u` in base-10, prefixed with `-` when `neg`.
///
/// For signed values the caller passes the two's-complement bit pattern
/// (`v as u64`) together with `neg = v < 0`; the negate here recovers the
/// magnitude, including `i64::MIN`.
pub fn format_bits(scratch: &mut FormatBitsScratch, out: &mut dyn EncodingBuffer, u: u64, neg: bool) {
    let mut u = u;
    if neg {
        out.write_byte(b'-');
        u = u.wrapping_neg();
    }
    let mut i = scratch.digits.len();
    loop {
        i -= 1;
        scratch.digits[i] = b'0' + (u % 10) as u8;
        u /= 10;
        if u == 0 {
            break;
        }
    }
    out.write_slice(&scratch.digits[i..]);
}

struct FmtAdapter<'a>(&'a mut dyn EncodingBuffer);

impl fmt::Write for FmtAdapter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_slice(s.as_bytes());
        Ok(())
    }
}

/// Shortest decimal that round-trips at 32-bit precision, no exponent.
pub fn format_float32(out: &mut dyn EncodingBuffer, f: f32) {
    let _ = write!(FmtAdapter(out), "{f}");
}

/// Shortest decimal that round-trips at 64-bit precision, no exponent.
pub fn format_float64(out: &mut dyn EncodingBuffer, f: f64) {
    let _ = write!(FmtAdapter(out), "{f}");
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Writes `s` as a double-quoted JSON string.
///
/// Bytes below 0x20 plus `"` and `\` are escaped; everything else,
/// including non-ASCII UTF-8, passes through untouched. Runs of plain
/// bytes land in a single write.
pub fn write_json_string(out: &mut dyn EncodingBuffer, s: &str) {
    out.write_byte(b'"');
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &c) in bytes.iter().enumerate() {
        if c >= 0x20 && c != b'"' && c != b'\\' {
            continue;
        }
        out.write_slice(&bytes[start..i]);
        match c {
            b'"' => out.write_slice(b"\\\""),
            b'\\' => out.write_slice(b"\\\\"),
            0x08 => out.write_slice(b"\\b"),
            0x0C => out.write_slice(b"\\f"),
            b'\n' => out.write_slice(b"\\n"),
            b'\r' => out.write_slice(b"\\r"),
            b'\t' => out.write_slice(b"\\t"),
            _ => {
                out.write_slice(b"\\u00");
                out.write_byte(HEX[usize::from(c >> 4)]);
                out.write_byte(HEX[usize::from(c & 0x0F)]);
            }
        }
        start = i + 1;
    }
    out.write_slice(&bytes[start..]);
    out.write_byte(b'"');
}
