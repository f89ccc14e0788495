//! Byte-stream assembly of framed lines
//!
//! The serial link delivers bytes with no guaranteed boundaries. The
//! [`LineAssembler`] buffers them until a complete `...##` frame is seen and
//! hands it back as a string ready for [`crate::parse`].

use heapless::{String, Vec};

use crate::command::MAX_FRAME_LEN;
use crate::parse::FRAME_SUFFIX;

/// Errors that can occur while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// More than [`MAX_FRAME_LEN`] bytes without a terminator
    Overflow,
    /// Completed line is not valid UTF-8
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssembleState {
    /// Skipping whitespace between frames
    WaitingForStart,
    /// Accumulating until the suffix is seen
    Reading,
}

/// State machine collecting bytes into complete frames
#[derive(Debug, Clone)]
pub struct LineAssembler {
    state: AssembleState,
    buffer: Vec<u8, MAX_FRAME_LEN>,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self {
            state: AssembleState::WaitingForStart,
            buffer: Vec::new(),
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.state = AssembleState::WaitingForStart;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the current line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when the buffered bytes end with `##`,
    /// `Ok(None)` when more bytes are needed. On error the partial line is
    /// dropped and assembly restarts.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<MAX_FRAME_LEN>>, LineError> {
        if self.state == AssembleState::WaitingForStart {
            if byte.is_ascii_whitespace() {
                return Ok(None);
            }
            self.state = AssembleState::Reading;
        }

        if self.buffer.push(byte).is_err() {
            self.reset();
            return Err(LineError::Overflow);
        }

        if !self.buffer.ends_with(FRAME_SUFFIX.as_bytes()) {
            return Ok(None);
        }

        let bytes = core::mem::take(&mut self.buffer);
        self.reset();
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| LineError::InvalidUtf8)
    }

    /// Feed multiple bytes, returning the first completed line
    ///
    /// Bytes after the completed line are left unconsumed; the second value
    /// is the number of bytes taken from `bytes`.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (Result<Option<String<MAX_FRAME_LEN>>, LineError>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => continue,
                other => return (other, i + 1),
            }
        }
        (Ok(None), bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_single_line() {
        let mut asm = LineAssembler::new();
        let (result, used) = asm.feed_bytes(b"!!system:ping:{}##");
        assert_eq!(result.unwrap().unwrap().as_str(), "!!system:ping:{}##");
        assert_eq!(used, 18);
        assert_eq!(asm.pending(), 0);
    }

    #[test]
    fn test_skips_leading_whitespace() {
        let mut asm = LineAssembler::new();
        let (result, _) = asm.feed_bytes(b"\r\n  !!a:b:{}##");
        assert_eq!(result.unwrap().unwrap().as_str(), "!!a:b:{}##");
    }

    #[test]
    fn test_split_across_reads() {
        let mut asm = LineAssembler::new();
        let (result, _) = asm.feed_bytes(b"!!star:add:{cou");
        assert_eq!(result, Ok(None));
        let (result, _) = asm.feed_bytes(b"nt=3}#");
        assert_eq!(result, Ok(None));
        let (result, _) = asm.feed_bytes(b"#");
        assert_eq!(result.unwrap().unwrap().as_str(), "!!star:add:{count=3}##");
    }

    #[test]
    fn test_back_to_back_lines() {
        let mut asm = LineAssembler::new();
        let input = b"!!a:b:{}##\n!!c:d:{}##";

        let (first, used) = asm.feed_bytes(input);
        assert_eq!(first.unwrap().unwrap().as_str(), "!!a:b:{}##");

        let (second, _) = asm.feed_bytes(&input[used..]);
        assert_eq!(second.unwrap().unwrap().as_str(), "!!c:d:{}##");
    }

    #[test]
    fn test_garbage_is_delivered_for_parse_to_reject() {
        let mut asm = LineAssembler::new();
        let (result, _) = asm.feed_bytes(b"hello##");
        assert_eq!(result.unwrap().unwrap().as_str(), "hello##");
    }

    #[test]
    fn test_overflow_resets() {
        let mut asm = LineAssembler::new();
        let mut overflowed = false;
        for _ in 0..=MAX_FRAME_LEN {
            if asm.feed(b'x') == Err(LineError::Overflow) {
                overflowed = true;
                break;
            }
        }
        assert!(overflowed);
        assert_eq!(asm.pending(), 0);

        // Recovers on the next frame
        let (result, _) = asm.feed_bytes(b"!!a:b:{}##");
        assert_eq!(result.unwrap().unwrap().as_str(), "!!a:b:{}##");
    }

    #[test]
    fn test_invalid_utf8() {
        let mut asm = LineAssembler::new();
        let (result, _) = asm.feed_bytes(&[b'!', b'!', 0xFF, b'#', b'#']);
        assert_eq!(result, Err(LineError::InvalidUtf8));
        assert_eq!(asm.pending(), 0);
    }
}
