//! Line buffering for newline-delimited streaming bodies

/// Buffer management for line-based streaming protocols.
///
/// Accumulates raw bytes and yields complete lines. Splitting happens on the
/// byte buffer, so a multi-byte UTF-8 character (or a whole line) split
/// across two network reads is reassembled before any decoding takes place.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Create a new line buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add data to the buffer and return every complete line, in order.
    ///
    /// Lines are trimmed of `\r` and surrounding whitespace; empty lines are
    /// skipped. Any trailing incomplete fragment stays buffered for the next
    /// read.
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(data);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let raw = std::mem::replace(&mut self.buffer, rest);
            let line = String::from_utf8_lossy(&raw[..pos]).trim().to_string();
            if !line.is_empty() {
                lines.push(line);
            }
        }

        lines
    }

    /// Yield any remaining unterminated line at end of stream
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}
