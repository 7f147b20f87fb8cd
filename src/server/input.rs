//! Line framing for inbound connection data.
//!
//! Clients are plain TCP line clients (netcat, telnet in line mode). A line
//! ends at CR or LF; CRLF counts once.

use tracing::debug;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const NUL: u8 = 0x00;

/// Accumulates raw bytes and splits them into lines.
#[derive(Debug)]
pub struct LineBuffer {
    /// Bytes of the line in progress.
    buffer: Vec<u8>,
    /// Maximum line length in bytes; extra bytes are dropped.
    max_size: usize,
    /// Whether the previous byte was CR, so a following LF is swallowed.
    after_cr: bool,
    /// Whether the line in progress overflowed.
    truncated: bool,
}

impl LineBuffer {
    /// Create a new line buffer with the given maximum line length.
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_size.min(1024)),
            max_size,
            after_cr: false,
            truncated: false,
        }
    }

    /// Feed a chunk of bytes and return every line it completes.
    pub fn feed(&mut self, data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in data {
            if let Some(line) = self.process_byte(byte) {
                lines.push(line);
            }
        }
        lines
    }

    /// Process a single byte, returning a line if it ended one.
    pub fn process_byte(&mut self, byte: u8) -> Option<String> {
        let after_cr = std::mem::replace(&mut self.after_cr, false);
        match byte {
            LF if after_cr => None,
            CR | LF => {
                self.after_cr = byte == CR;
                Some(self.take_line())
            }
            NUL => None,
            _ => {
                if self.buffer.len() < self.max_size {
                    self.buffer.push(byte);
                } else {
                    self.truncated = true;
                }
                None
            }
        }
    }

    /// Take whatever is buffered as a line, e.g. when the peer hangs up
    /// without a final newline.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        if self.truncated {
            debug!("Line truncated to {} bytes", self.max_size);
        }
        self.buffer.clear();
        self.truncated = false;
        line
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(4096)
    }
}
