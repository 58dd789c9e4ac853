use crate::types::{FRAME_CAPACITY, FRAME_STORAGE, WEIGHT_DIGITS};

/// Raw bytes of the frame currently being received, plus the write cursor.
///
/// The cursor always stays inside `0..FRAME_CAPACITY`; callers detect overflow
/// through [`FrameBuffer::advance`].
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    bytes: [u8; FRAME_STORAGE],
    cursor: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; FRAME_STORAGE],
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..FRAME_CAPACITY]
    }

    /// Store a byte at the cursor without moving it.
    pub fn store(&mut self, byte: u8) {
        self.bytes[self.cursor] = byte;
    }

    /// Move the cursor to the start of the buffer.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Step the cursor forward. Returns `false` (and rewinds) on overflow.
    pub fn advance(&mut self) -> bool {
        self.cursor += 1;
        if self.cursor >= FRAME_CAPACITY {
            self.cursor = 0;
            return false;
        }
        true
    }

    /// Copy the weight digits that follow the start marker. Copying stops at
    /// the first NUL; the remaining digits stay zero.
    pub fn digits(&self) -> [u8; WEIGHT_DIGITS] {
        let mut digits = [0u8; WEIGHT_DIGITS];
        for (dst, &src) in digits.iter_mut().zip(&self.bytes[1..=WEIGHT_DIGITS]) {
            if src == 0 {
                break;
            }
            *dst = src;
        }
        digits
    }

    /// Copy of the frame with a NUL terminator at the cursor, so bytes left
    /// over from an earlier, longer frame never leak into the digits.
    pub fn terminated(&self) -> Self {
        let mut copy = self.clone();
        copy.bytes[copy.cursor] = 0x00;
        copy
    }

    /// Zero every tracked byte and rewind.
    pub fn clear(&mut self) {
        self.bytes = [0; FRAME_STORAGE];
        self.cursor = 0;
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_at_capacity() {
        let mut buffer = FrameBuffer::new();
        for _ in 0..FRAME_CAPACITY - 1 {
            assert!(buffer.advance());
        }
        assert_eq!(buffer.cursor(), FRAME_CAPACITY - 1);
        assert!(!buffer.advance());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_digits_stop_at_nul() {
        let mut buffer = FrameBuffer::new();
        for &b in b"\x021234" {
            buffer.store(b);
            buffer.advance();
        }
        assert_eq!(&buffer.digits(), b"1234\0\0\0\0");
    }

    #[test]
    fn test_terminated_hides_stale_bytes() {
        let mut buffer = FrameBuffer::new();
        for &b in b"\x0299999999" {
            buffer.store(b);
            buffer.advance();
        }
        buffer.rewind();
        for &b in b"\x0212" {
            buffer.store(b);
            buffer.advance();
        }
        assert_eq!(&buffer.digits(), b"12999999");
        assert_eq!(&buffer.terminated().digits(), b"12\0\0\0\0\0\0");
        assert_eq!(buffer.as_bytes()[3], b'9');
    }

    #[test]
    fn test_clear() {
        let mut buffer = FrameBuffer::new();
        buffer.store(0x41);
        buffer.advance();
        buffer.store(0x42);
        buffer.clear();
        assert_eq!(buffer.cursor(), 0);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }
}
