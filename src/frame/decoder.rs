//! Byte-at-a-time decoder for the scale's framed ASCII output.
//!
//! A frame looks like `0x02 <8 digits> <unit> <mode> ... 0x0D`. The scale does
//! not resend unit and mode on every frame, so those fields live in the
//! [`DecodeContext`] and survive from one frame to the next.

use super::buffer::FrameBuffer;
use crate::protocol::{CR, STX};
use crate::types::{DecodeContext, Mode, Unit};
use log::{debug, warn};

/// What a single byte means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteAction {
    StartFrame,
    Lock,
    SetUnit(Unit),
    SetMode(Mode),
    EndFrame,
    Diagnostic,
    Ignore,
    Store,
}

/// Byte dispatch table. Kept free of side effects so each entry can be
/// checked on its own.
pub const fn classify(byte: u8) -> ByteAction {
    match byte {
        STX => ByteAction::StartFrame,
        b'H' => ByteAction::Lock,
        b'L' => ByteAction::SetUnit(Unit::Pounds),
        b'K' => ByteAction::SetUnit(Unit::Kilograms),
        b'G' => ByteAction::SetMode(Mode::Gross),
        b'N' => ByteAction::SetMode(Mode::Net),
        CR => ByteAction::EndFrame,
        b'M' | b'O' => ByteAction::Diagnostic,
        b'.' | b' ' => ByteAction::Ignore,
        _ => ByteAction::Store,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No start marker seen since boot, the last completed frame, or the last overflow.
    AwaitingStart,
    InFrame,
    /// The previous byte overflowed the buffer and the partial frame was dropped.
    Overflowed,
}

/// Result of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    Pending,
    Complete,
    Overflow,
}

pub struct FrameDecoder {
    buffer: FrameBuffer,
    context: DecodeContext,
    state: DecoderState,
    overflow_count: u32,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: FrameBuffer::new(),
            context: DecodeContext::default(),
            state: DecoderState::AwaitingStart,
            overflow_count: 0,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn context(&self) -> DecodeContext {
        self.context
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffer
    }

    /// Mark the in-progress frame as consumed. Called by the emitter after it
    /// has cleared the buffer.
    pub(crate) fn finish_frame(&mut self) {
        self.state = DecoderState::AwaitingStart;
    }

    /// Feed the next serial byte.
    ///
    /// The completion byte does not clear the buffer; the emitter does that
    /// right after a `Complete` outcome.
    pub fn push(&mut self, byte: u8) -> DecodeOutcome {
        let action = classify(byte);
        let mut complete = false;

        match action {
            ByteAction::StartFrame => {
                if self.state == DecoderState::InFrame && self.buffer.cursor() > 0 {
                    debug!("Start marker mid-frame, dropping {} bytes", self.buffer.cursor());
                }
                self.buffer.rewind();
                self.state = DecoderState::InFrame;
            }
            ByteAction::Lock => self.context.lock_flag = true,
            ByteAction::SetUnit(unit) => self.context.unit = unit,
            ByteAction::SetMode(mode) => self.context.mode = mode,
            ByteAction::EndFrame => complete = true,
            ByteAction::Diagnostic => {
                debug!("Found {:?} at position {}", byte as char, self.buffer.cursor());
            }
            ByteAction::Ignore | ByteAction::Store => {}
        }

        self.buffer.store(byte);

        if !self.buffer.advance() {
            self.overflow_count = self.overflow_count.wrapping_add(1);
            warn!("Frame buffer overflow, discarding partial frame");
            self.state = DecoderState::Overflowed;
            return DecodeOutcome::Overflow;
        }

        if self.state == DecoderState::Overflowed && action != ByteAction::StartFrame {
            self.state = DecoderState::AwaitingStart;
        }

        if complete {
            DecodeOutcome::Complete
        } else {
            DecodeOutcome::Pending
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FRAME_CAPACITY;

    fn feed(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<DecodeOutcome> {
        bytes.iter().map(|&b| decoder.push(b)).collect()
    }

    #[test]
    fn test_dispatch_table() {
        assert_eq!(classify(0x02), ByteAction::StartFrame);
        assert_eq!(classify(b'H'), ByteAction::Lock);
        assert_eq!(classify(b'L'), ByteAction::SetUnit(Unit::Pounds));
        assert_eq!(classify(b'K'), ByteAction::SetUnit(Unit::Kilograms));
        assert_eq!(classify(b'G'), ByteAction::SetMode(Mode::Gross));
        assert_eq!(classify(b'N'), ByteAction::SetMode(Mode::Net));
        assert_eq!(classify(0x0D), ByteAction::EndFrame);
        assert_eq!(classify(b'M'), ByteAction::Diagnostic);
        assert_eq!(classify(b'O'), ByteAction::Diagnostic);
        assert_eq!(classify(b'.'), ByteAction::Ignore);
        assert_eq!(classify(b' '), ByteAction::Ignore);
        assert_eq!(classify(b'7'), ByteAction::Store);
        assert_eq!(classify(b'l'), ByteAction::Store);
    }

    #[test]
    fn test_complete_frame() {
        let mut decoder = FrameDecoder::new();
        let outcomes = feed(&mut decoder, b"\x02  123.45KG\r");
        let completions = outcomes.iter().filter(|o| **o == DecodeOutcome::Complete).count();
        assert_eq!(completions, 1);
        assert_eq!(*outcomes.last().unwrap(), DecodeOutcome::Complete);
        assert_eq!(decoder.context().unit, Unit::Kilograms);
        assert_eq!(decoder.context().mode, Mode::Gross);
        assert_eq!(decoder.state(), DecoderState::InFrame);
        // Completion alone does not rewind the cursor
        assert_eq!(decoder.cursor(), 12);
    }

    #[test]
    fn test_start_marker_resets_mid_frame() {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, b"\x02999");
        assert_eq!(decoder.cursor(), 4);
        decoder.push(0x02);
        assert_eq!(decoder.cursor(), 1);
        assert_eq!(decoder.buffer_mut().as_bytes()[0], 0x02);
    }

    #[test]
    fn test_context_persists_across_frames() {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, b"\x0200001000LN\r");
        decoder.buffer_mut().clear();
        decoder.finish_frame();
        feed(&mut decoder, b"\x0200002000\r");
        assert_eq!(decoder.context().unit, Unit::Pounds);
        assert_eq!(decoder.context().mode, Mode::Net);
    }

    #[test]
    fn test_lock_flag_is_sticky() {
        let mut decoder = FrameDecoder::new();
        assert!(!decoder.context().lock_flag);
        feed(&mut decoder, b"\x02H");
        assert!(decoder.context().lock_flag);
        feed(&mut decoder, b"\x0200001000\r");
        assert!(decoder.context().lock_flag);
    }

    #[test]
    fn test_overflow_resets_cursor() {
        let mut decoder = FrameDecoder::new();
        decoder.push(0x02);
        for _ in 0..FRAME_CAPACITY - 2 {
            assert_eq!(decoder.push(b'1'), DecodeOutcome::Pending);
            assert!(decoder.cursor() < FRAME_CAPACITY);
        }
        assert_eq!(decoder.push(b'1'), DecodeOutcome::Overflow);
        assert_eq!(decoder.cursor(), 0);
        assert_eq!(decoder.state(), DecoderState::Overflowed);
        assert_eq!(decoder.overflow_count(), 1);
    }

    #[test]
    fn test_overflow_suppresses_completion() {
        let mut decoder = FrameDecoder::new();
        decoder.push(0x02);
        for _ in 0..FRAME_CAPACITY - 2 {
            decoder.push(b'9');
        }
        // Terminator lands on the last slot and overflows
        assert_eq!(decoder.push(0x0D), DecodeOutcome::Overflow);
    }

    #[test]
    fn test_cursor_never_leaves_bounds() {
        let mut decoder = FrameDecoder::new();
        for i in 0..1000u32 {
            decoder.push((i % 251) as u8);
            assert!(decoder.cursor() < FRAME_CAPACITY);
        }
    }

    #[test]
    fn test_recovers_after_overflow() {
        let mut decoder = FrameDecoder::new();
        feed(&mut decoder, &[b'x'; FRAME_CAPACITY]);
        assert_eq!(decoder.state(), DecoderState::Overflowed);
        decoder.push(b'y');
        assert_eq!(decoder.state(), DecoderState::AwaitingStart);
        let outcomes = feed(&mut decoder, b"\x0200000500KG\r");
        assert_eq!(*outcomes.last().unwrap(), DecodeOutcome::Complete);
    }
}
