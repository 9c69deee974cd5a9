use thiserror::Error;

/// Errors surfaced by the reader and by generated marshal routines.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-hex byte inside a `\uXXXX` escape; carries the digits read so
    /// far.
    #[error("invalid hex char {byte:#04x} in unicode escape after {partial:?}")]
    InvalidHexChar { byte: u8, partial: String },

    /// A surrogate escape pair that does not combine to a code point.
    #[error("invalid unicode surrogate pair \\u{high:04X}\\u{low:04X}")]
    InvalidUnicodeSurrogate { high: u16, low: u16 },

    /// A backslash followed by a byte outside the valid-escape set.
    #[error("invalid escaped char {0:#04x}")]
    InvalidEscapedChar(u8),

    /// A control byte inside a string body.
    #[error("invalid json char {0:#04x} in string")]
    InvalidJsonChar(u8),

    /// The stream ended mid-token.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The underlying byte source failed.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// A delegate marshaler failed; the cause is propagated unchanged.
    #[error("emit error: {0}")]
    Emit(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a fallback encoder failure; generated code maps delegate
    /// errors through this.
    pub fn emit(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Emit(err.into())
    }
}
