//! CR+LF line framing for the serial byte stream

use tracing::warn;

/// Terminator the sensor firmware appends to every line
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Longest partial line held while waiting for a terminator. Firmware lines
/// are well under 100 bytes; anything longer is noise such as a baud mismatch.
pub const MAX_PENDING: usize = 1024;

/// Accumulates raw serial chunks and splits out complete lines.
///
/// A chunk may contain any number of complete lines followed by a partial
/// one. Only complete lines are returned; the partial tail is held until a
/// later chunk supplies its terminator.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, terminators stripped.
    ///
    /// Bytes are decoded as UTF-8 with invalid sequences replaced, since the
    /// firmware only ever sends ASCII and a corrupted byte should cost one
    /// line rather than the stream.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // Only a terminator straddling the old tail and the chunk can be new
        let mut scan_from = self
            .buffer
            .len()
            .saturating_sub(LINE_TERMINATOR.len() - 1);
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = find_terminator(&self.buffer[scan_from..]) {
            let end = scan_from + offset;
            lines.push(String::from_utf8_lossy(&self.buffer[start..end]).into_owned());
            start = end + LINE_TERMINATOR.len();
            scan_from = start;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        if self.buffer.len() > MAX_PENDING {
            warn!(
                "Dropping {} bytes without a line terminator",
                self.buffer.len()
            );
            // Keep a trailing CR so a terminator split across chunks survives
            let keep = usize::from(self.buffer.last() == Some(&LINE_TERMINATOR[0]));
            self.buffer.drain(..self.buffer.len() - keep);
        }
        lines
    }

    /// Bytes received since the last complete line
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Discard any buffered partial line
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn find_terminator(data: &[u8]) -> Option<usize> {
    data.windows(LINE_TERMINATOR.len())
        .position(|window| window == LINE_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chunk_yields_nothing() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"").is_empty());
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"Orientation: 1.0").is_empty());
        assert_eq!(buf.pending(), b"Orientation: 1.0");
    }

    #[test]
    fn test_single_complete_line() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"Pot: 512\r\n");
        assert_eq!(lines, vec!["Pot: 512".to_string()]);
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn test_multiple_lines_and_trailing_partial() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"Pot: 1\r\nPot: 2\r\nOrientation: 3 4 5\r\nPot: 6");
        assert_eq!(lines, vec!["Pot: 1", "Pot: 2", "Orientation: 3 4 5"]);
        assert_eq!(buf.pending(), b"Pot: 6");

        let lines = buf.push(b"00\r\n");
        assert_eq!(lines, vec!["Pot: 600"]);
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"Pot: 42\r").is_empty());
        assert_eq!(buf.push(b"\nPot"), vec!["Pot: 42"]);
        assert_eq!(buf.pending(), b"Pot");
    }

    #[test]
    fn test_bare_newline_is_not_a_terminator() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"Pot: 1\nPot: 2").is_empty());
        assert_eq!(buf.push(b"\r\n"), vec!["Pot: 1\nPot: 2"]);
    }

    #[test]
    fn test_empty_lines_are_returned() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push(b"\r\n\r\n"), vec!["", ""]);
    }

    #[test]
    fn test_runaway_partial_is_capped() {
        let mut buf = LineBuffer::new();
        for _ in 0..100 {
            assert!(buf.push(&[b'x'; 100]).is_empty());
            assert!(buf.pending().len() <= MAX_PENDING);
        }
        // Framing recovers at the next terminator
        assert_eq!(buf.push(b"\r\nPot: 5\r\n").len(), 2);
        assert!(buf.pending().is_empty());
    }

    #[test]
    fn test_cap_keeps_trailing_cr() {
        let mut buf = LineBuffer::new();
        let mut noise = vec![b'x'; MAX_PENDING];
        noise.push(b'\r');
        assert!(buf.push(&noise).is_empty());
        assert_eq!(buf.pending(), b"\r");
        assert_eq!(buf.push(b"\nPot: 5\r\n"), vec!["", "Pot: 5"]);
    }

    #[test]
    fn test_many_small_chunks() {
        let mut buf = LineBuffer::new();
        let mut lines = Vec::new();
        for byte in b"Pot: 1\r\nPot: 22\r\n" {
            lines.extend(buf.push(&[*byte]));
        }
        assert_eq!(lines, vec!["Pot: 1", "Pot: 22"]);
    }

    #[test]
    fn test_clear_drops_partial() {
        let mut buf = LineBuffer::new();
        buf.push(b"garbage");
        buf.clear();
        assert_eq!(buf.push(b"Pot: 3\r\n"), vec!["Pot: 3"]);
    }
}
