//! Refillable byte reader with table-driven scanning over a pooled buffer.

use std::io::Read;

use crate::{
    buffer::DecodingBuffer,
    error::Error,
    pool,
    tables::{BYTE_CLASS, SLICE_STRING_MASK, VEC, VHC, WHITESPACE},
};

/// How [`Reader::slice_string`] treats backslash escapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeMode {
    /// Decode escapes into the output buffer, `\uXXXX` as UTF-8.
    #[default]
    Decode,
    /// Validate escapes but copy them through verbatim.
    Preserve,
}

/// Reader configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    pub escape_mode: EscapeMode,
}

/// Buffered reader over an upstream byte source.
///
/// Unread input is `buffer[head..tail]`; refills compact unread data to
/// offset 0 before reading more and never enlarge the backing storage. The
/// backing buffer comes from the shared pool and returns to it on drop, so
/// every exit path releases it.
#[derive(Debug)]
pub struct Reader<R> {
    buffer: Vec<u8>,
    source: R,
    head: usize,
    tail: usize,
    opts: ReaderOptions,
}

impl<R: Read> Reader<R> {
    pub fn new(source: R) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, opts: ReaderOptions) -> Self {
        let mut buffer = pool::acquire_buffer();
        buffer.resize(buffer.capacity(), 0);
        Self {
            buffer,
            source,
            head: 0,
            tail: 0,
            opts,
        }
    }

    /// Rebinds the upstream source, keeping the backing storage.
    pub fn reset(&mut self, source: R) {
        self.source = source;
        self.head = 0;
        self.tail = 0;
    }

    /// Next-read index into the backing buffer.
    pub fn pos(&self) -> usize {
        self.head
    }

    /// Line and column of the current position, counted by rescanning
    /// `[0, head)`. O(head) — error paths only.
    pub fn pos_with_line(&self) -> (usize, usize) {
        let mut line = 1;
        let mut column = 0;
        for &c in &self.buffer[..self.head] {
            column += 1;
            if c == b'\n' {
                line += 1;
                column = 0;
            }
        }
        (line, column)
    }

    /// Borrows `buffer[start..stop]`. The view is invalidated by the next
    /// refill or reset; callers needing a longer lifetime must copy.
    pub fn slice(&self, start: usize, stop: usize) -> &[u8] {
        &self.buffer[start..stop]
    }

    /// Compacts unread data to offset 0 and performs one read into the free
    /// trailing capacity. End-of-stream is not an error; the caller
    /// observes it as an empty buffer.
    pub fn load_more(&mut self) -> Result<(), Error> {
        if self.head > 0 {
            self.buffer.copy_within(self.head..self.tail, 0);
            self.tail -= self.head;
            self.head = 0;
        }
        let n = self.source.read(&mut self.buffer[self.tail..])?;
        self.tail += n;
        Ok(())
    }

    /// Returns the byte at `head` and advances. No refill is attempted;
    /// callers combine with [`Reader::load_more`] explicitly.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        if self.head >= self.tail {
            return Err(Error::UnexpectedEof);
        }
        let c = self.buffer[self.head];
        self.head += 1;
        Ok(c)
    }

    /// Steps back one byte.
    ///
    /// # Panics
    ///
    /// Panics when already at the beginning of the buffer.
    pub fn unread_byte(&mut self) {
        assert!(self.head > 0, "unread_byte at beginning of buffer");
        self.head -= 1;
    }

    /// Refills once, then advances past whitespace and returns the first
    /// non-whitespace byte. One table lookup per byte.
    pub fn read_byte_skip_whitespace(&mut self) -> Result<u8, Error> {
        self.load_more()?;
        while self.head < self.tail {
            let c = self.buffer[self.head];
            self.head += 1;
            if !WHITESPACE[c as usize] {
                return Ok(c);
            }
        }
        Err(Error::UnexpectedEof)
    }

    /// Consumes a JSON string body starting at `head` (the opening quote
    /// already read), appending the unescaped content to `out`, and leaves
    /// `head` just past the closing quote.
    ///
    /// The fast path walks bytes until the closing quote or a byte flagged
    /// by the class table, then flushes the whole run as one slice; escapes
    /// are handled according to [`ReaderOptions::escape_mode`]. Refills
    /// mid-string keep already-scanned progress.
    pub fn slice_string<B: DecodingBuffer + ?Sized>(&mut self, out: &mut B) -> Result<(), Error> {
        'refill: loop {
            let mut j = self.head;
            while j < self.tail {
                let c = self.buffer[j];
                if c == b'"' {
                    out.put_slice(&self.buffer[self.head..j]);
                    self.head = j + 1;
                    return Ok(());
                }
                if BYTE_CLASS[c as usize] & SLICE_STRING_MASK != 0 {
                    out.put_slice(&self.buffer[self.head..j]);
                    self.head = j;
                    if c != b'\\' {
                        return Err(Error::InvalidJsonChar(c));
                    }
                    self.handle_escape(out)?;
                    continue 'refill;
                }
                j += 1;
            }
            out.put_slice(&self.buffer[self.head..j]);
            self.head = j;
            self.load_more()?;
            if self.head >= self.tail {
                return Err(Error::UnexpectedEof);
            }
        }
    }

    /// Guarantees at least `n` unread bytes, refilling as needed.
    fn ensure(&mut self, n: usize) -> Result<(), Error> {
        while self.tail - self.head < n {
            let unread = self.tail - self.head;
            self.load_more()?;
            if self.tail - self.head == unread {
                return Err(Error::UnexpectedEof);
            }
        }
        Ok(())
    }

    /// `head` points at a backslash.
    fn handle_escape<B: DecodingBuffer + ?Sized>(&mut self, out: &mut B) -> Result<(), Error> {
        self.ensure(2)?;
        let c = self.buffer[self.head + 1];
        if c == b'u' {
            return self.handle_unicode_escape(out);
        }
        if BYTE_CLASS[c as usize] & VEC == 0 {
            return Err(Error::InvalidEscapedChar(c));
        }
        match self.opts.escape_mode {
            EscapeMode::Decode => out.put_byte(decode_simple_escape(c)),
            EscapeMode::Preserve => out.put_slice(&self.buffer[self.head..self.head + 2]),
        }
        self.head += 2;
        Ok(())
    }

    /// `head` points at the backslash of a `\uXXXX` escape.
    fn handle_unicode_escape<B: DecodingBuffer + ?Sized>(
        &mut self,
        out: &mut B,
    ) -> Result<(), Error> {
        self.ensure(6)?;
        let u1 = self.read_u4(self.head + 2)?;
        if (0xD800..0xE000).contains(&u1) {
            // A surrogate must be followed by its partner escape.
            self.ensure(12)?;
            if self.buffer[self.head + 6] != b'\\' || self.buffer[self.head + 7] != b'u' {
                return Err(Error::InvalidUnicodeSurrogate { high: u1, low: 0 });
            }
            let u2 = self.read_u4(self.head + 8)?;
            let Some(rune) = combine_surrogates(u1, u2) else {
                return Err(Error::InvalidUnicodeSurrogate { high: u1, low: u2 });
            };
            match self.opts.escape_mode {
                EscapeMode::Decode => out.put_char(rune),
                EscapeMode::Preserve => out.put_slice(&self.buffer[self.head..self.head + 12]),
            }
            self.head += 12;
        } else {
            // Outside the surrogate range every u16 is a scalar value.
            let rune = char::from_u32(u32::from(u1)).unwrap_or(char::REPLACEMENT_CHARACTER);
            match self.opts.escape_mode {
                EscapeMode::Decode => out.put_char(rune),
                EscapeMode::Preserve => out.put_slice(&self.buffer[self.head..self.head + 6]),
            }
            self.head += 6;
        }
        Ok(())
    }

    /// Returns the backing buffer to the shared pool. Dropping the reader
    /// does the same, so errors and panics release it too.
    pub fn release(self) {}

    /// Parses exactly four hex digits at `at`.
    fn read_u4(&self, at: usize) -> Result<u16, Error> {
        let quartet = &self.buffer[at..at + 4];
        let mut v: u16 = 0;
        for (i, &c) in quartet.iter().enumerate() {
            if BYTE_CLASS[c as usize] & VHC == 0 {
                return Err(Error::InvalidHexChar {
                    byte: c,
                    partial: String::from_utf8_lossy(&quartet[..i]).into_owned(),
                });
            }
            v = v << 4 | u16::from(hex_value(c));
        }
        Ok(v)
    }
}

impl<R> Drop for Reader<R> {
    fn drop(&mut self) {
        pool::release_buffer(std::mem::take(&mut self.buffer));
    }
}

fn decode_simple_escape(c: u8) -> u8 {
    match c {
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        // The class table admits only the eight simple targets here; the
        // remaining three map to themselves.
        _ => c,
    }
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    if !(0xD800..0xDC00).contains(&high) || !(0xDC00..0xE000).contains(&low) {
        return None;
    }
    let c = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(c)
}
