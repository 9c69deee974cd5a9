#![no_main]

use std::io::{self, Read};

use jsonsmith::{EscapeMode, Reader, ReaderOptions};
use libfuzzer_sys::fuzz_target;

#[derive(arbitrary::Arbitrary, Debug)]
struct Case {
    chunk: u8,
    preserve: bool,
    data: Vec<u8>,
}

/// Yields at most `chunk` bytes per read so refill paths get exercised.
struct Chunked {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl Read for Chunked {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(out.len()).min(self.data.len() - self.pos);
        out[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fuzz_target!(|case: Case| {
    let opts = ReaderOptions {
        escape_mode: if case.preserve {
            EscapeMode::Preserve
        } else {
            EscapeMode::Decode
        },
    };
    let source = Chunked {
        data: case.data,
        pos: 0,
        chunk: usize::from(case.chunk).max(1),
    };
    // Any outcome but a panic is fine; the pooled buffer must come back on
    // every path, including errors.
    let mut out = Vec::new();
    let mut reader = Reader::with_options(source, opts);
    let _ = reader.slice_string(&mut out);
});
