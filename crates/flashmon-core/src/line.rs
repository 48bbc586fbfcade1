//! Incremental line framing for the console input stream
//!
//! The transport delivers bytes one at a time; the assembler collects them
//! into carriage-return-terminated lines of bounded length. Overflow policy
//! is silent truncation: the target is too constrained for per-byte
//! diagnostics, so bytes past the capacity are dropped without any signal
//! on the protocol sink.

use core::mem;

use heapless::Vec;

/// Line terminator on the wire.
pub const TERMINATOR: u8 = b'\r';

/// Line buffer capacity. One slot is reserved for the terminator, so a
/// line holds at most `LINE_CAP - 1` bytes.
pub const LINE_CAP: usize = 128;

/// A completed input line, terminator stripped.
pub type Line = Vec<u8, LINE_CAP>;

/// Reassembles a byte stream into discrete lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Line,
}

impl LineAssembler {
    /// Create an empty assembler.
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed one byte; returns the completed line on a terminator.
    ///
    /// A terminator with nothing buffered is discarded, so stray CR/LF
    /// pairs never fire empty commands. The buffer is cleared when a line
    /// is returned.
    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        if byte == TERMINATOR {
            if self.buf.is_empty() {
                None
            } else {
                Some(mem::take(&mut self.buf))
            }
        } else {
            if self.buf.len() < LINE_CAP - 1 {
                // cannot fail: length checked against capacity above
                let _ = self.buf.push(byte);
            } else {
                log::trace!("line buffer full, dropping byte {:#04x}", byte);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(asm: &mut LineAssembler, bytes: &[u8]) -> Option<Line> {
        let mut line = None;
        for &b in bytes {
            if let Some(l) = asm.feed(b) {
                line = Some(l);
            }
        }
        line
    }

    #[test]
    fn test_terminated_line_is_returned() {
        let mut asm = LineAssembler::new();
        let line = feed_all(&mut asm, b"dump\r").unwrap();
        assert_eq!(line.as_slice(), b"dump");
    }

    #[test]
    fn test_empty_line_is_discarded() {
        let mut asm = LineAssembler::new();
        assert!(asm.feed(b'\r').is_none());
    }

    #[test]
    fn test_buffer_resets_after_line() {
        let mut asm = LineAssembler::new();
        feed_all(&mut asm, b"id\r").unwrap();
        let line = feed_all(&mut asm, b"cap\r").unwrap();
        assert_eq!(line.as_slice(), b"cap");
    }

    #[test]
    fn test_overflow_truncates_silently() {
        let mut asm = LineAssembler::new();
        for _ in 0..130 {
            assert!(asm.feed(b'x').is_none());
        }
        let line = asm.feed(b'\r').unwrap();
        assert_eq!(line.len(), LINE_CAP - 1);
        assert!(line.iter().all(|&b| b == b'x'));
    }
}
