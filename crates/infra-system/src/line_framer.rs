//! Line framing for streamed process output.
//!
//! Bytes are accumulated until a `\n` delimiter; each delimiter completes one
//! line. Bytes still pending when the stream ends are handed back by
//! [`LineFramer::finish`] so the caller decides what to do with them.

const NEWLINE: u8 = b'\n';

/// Accumulate-until-delimiter state machine
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every line it completed (without the `\n`)
    ///
    /// Invalid UTF-8 is replaced with U+FFFD.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == NEWLINE) {
            self.pending.extend_from_slice(&rest[..pos]);
            lines.push(String::from_utf8_lossy(&self.pending).into_owned());
            self.pending.clear();
            rest = &rest[pos + 1..];
        }
        self.pending.extend_from_slice(rest);

        lines
    }

    /// Bytes of the current unterminated line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// End of stream: the unterminated remainder, if any
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}
