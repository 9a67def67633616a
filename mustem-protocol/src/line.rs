//! Line accumulation for the serial link.
//!
//! Bytes are fed one at a time. A `\n` or `\r` terminates the current line.
//! Lines are bounded: once a line grows past [`MAX_LINE_LEN`] its bytes are
//! dropped until the next terminator, which reports [`LineError::Overflow`]
//! exactly once. The reader is then back in sync for the following line.

use heapless::{String, Vec};

/// Maximum accepted line length in bytes (terminator excluded)
pub const MAX_LINE_LEN: usize = 128;

/// A complete line, without its terminator
pub type Line = String<MAX_LINE_LEN>;

/// Errors reported when a terminator closes an unusable line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the maximum length and was discarded
    Overflow,
    /// Line contained bytes that are not valid UTF-8
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Appending bytes to the current line
    Accumulating,
    /// Current line overflowed, dropping bytes until a terminator
    Discarding,
}

/// Accumulates bytes into terminated lines
#[derive(Debug, Clone)]
pub struct LineReader {
    state: ReadState,
    buffer: Vec<u8, MAX_LINE_LEN>,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader {
    /// Create an empty reader
    pub const fn new() -> Self {
        Self {
            state: ReadState::Accumulating,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.state = ReadState::Accumulating;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// True while an over-long line is being skipped
    pub fn is_discarding(&self) -> bool {
        self.state == ReadState::Discarding
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a terminator closes a non-empty line,
    /// `Ok(None)` when more bytes are needed (or the line was empty), and
    /// `Err` when a terminator closes a line that had to be dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match byte {
            b'\n' | b'\r' => self.terminate(),
            _ => {
                if self.state == ReadState::Accumulating && self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = ReadState::Discarding;
                }
                Ok(None)
            }
        }
    }

    /// Iterate over the lines completed by `bytes`
    ///
    /// All bytes are consumed; a trailing partial line stays buffered.
    pub fn lines<'a>(&'a mut self, bytes: &'a [u8]) -> Lines<'a> {
        Lines {
            reader: self,
            bytes: bytes.iter(),
        }
    }

    fn terminate(&mut self) -> Result<Option<Line>, LineError> {
        if self.state == ReadState::Discarding {
            self.state = ReadState::Accumulating;
            return Err(LineError::Overflow);
        }
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let result = match core::str::from_utf8(&self.buffer) {
            Ok(text) => {
                let mut line = Line::new();
                // Capacity matches the buffer, so this cannot fail
                let _ = line.push_str(text);
                Ok(Some(line))
            }
            Err(_) => Err(LineError::InvalidUtf8),
        };
        self.buffer.clear();
        result
    }
}

/// Iterator returned by [`LineReader::lines`]
pub struct Lines<'a> {
    reader: &'a mut LineReader,
    bytes: core::slice::Iter<'a, u8>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Result<Line, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            match self.reader.feed(byte) {
                Ok(Some(line)) => return Some(Ok(line)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
