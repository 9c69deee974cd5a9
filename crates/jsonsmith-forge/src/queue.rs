//! Deferred-write queue: a generation-time peephole over literal output.

/// Pending literal fragments awaiting one coalesced write statement.
///
/// The emitter describes output as a mix of compile-time-known literals and
/// runtime-computed values; literals queued across adjacent fields of a
/// record fuse into a single `write_str` in the emitted routine. This is a
/// generation-time artifact only — nothing is queued at runtime.
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    fragments: Vec<String>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a literal fragment.
    pub fn write(&mut self, s: &str) {
        self.fragments.push(s.to_owned());
    }

    /// Emits one statement writing everything queued, then clears. An
    /// empty queue emits nothing.
    pub fn flush(&mut self) -> String {
        let stmt = self.get_queued();
        self.fragments.clear();
        stmt
    }

    /// The flush statement without clearing. The boolean encoder uses this
    /// to fold `true` into the pending literals of one branch while the
    /// other branch rewrites them.
    pub fn get_queued(&self) -> String {
        let pending = self.fragments.concat();
        if pending.is_empty() {
            return String::new();
        }
        format!("buf.write_str({});\n", rust_str_lit(&pending))
    }

    /// Drops the last queued fragment.
    pub fn delete_last(&mut self) {
        self.fragments.pop();
    }

    /// Queues `s`, then flushes.
    pub fn write_flush(&mut self, s: &str) -> String {
        self.write(s);
        self.flush()
    }
}

/// Escapes `s` into a Rust double-quoted string literal, ready to embed in
/// emitted source.
pub(crate) fn rust_str_lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
