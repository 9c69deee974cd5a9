//! Scanning and buffering runtime for jsonsmith's generated JSON marshalers.
//!
//! The crate has two halves. The read side is [`Reader`], a refillable
//! buffered reader over any [`std::io::Read`] source that tokenizes JSON
//! string bodies with table-driven byte classification and decodes escapes
//! (including UTF-16 surrogate pairs) into a caller-supplied
//! [`DecodingBuffer`]. The write side is the set of helpers generated
//! marshal code calls into: [`Buffer`] and the [`EncodingBuffer`]
//! abstraction, [`format_bits`] for scratch-based integer formatting,
//! shortest-roundtrip float formatting, and [`write_json_string`].
//!
//! Specialized marshal routines are produced per record type by the
//! companion `jsonsmith-forge` crate; they surface here as implementations
//! of [`Marshal`] and [`MarshalFast`].

mod buffer;
mod error;
mod format;
mod marshal;
mod pool;
mod reader;
mod tables;

pub use buffer::{Buffer, DecodingBuffer, EncodingBuffer};
pub use error::Error;
pub use format::{
    FormatBitsScratch, format_bits, format_float32, format_float64, write_json_string,
};
pub use marshal::{Marshal, MarshalFast};
pub use reader::{EscapeMode, Reader, ReaderOptions};
