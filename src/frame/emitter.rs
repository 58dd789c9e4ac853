use super::decoder::FrameDecoder;
use crate::types::WeightReading;
use bstr::ByteSlice;
use log::debug;

/// Turns a completed frame into a [`WeightReading`] and resets the decoder's
/// buffer for the next frame.
#[derive(Debug, Default)]
pub struct WeightEmitter {
    emitted_count: u32,
}

impl WeightEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the reading from a decoder that just reported `Complete`.
    ///
    /// Identical consecutive readings are emitted again; consumers expect a
    /// steady notification stream.
    pub fn emit(&mut self, decoder: &mut FrameDecoder) -> WeightReading {
        let context = decoder.context();
        let buffer = decoder.buffer_mut();

        let digits = buffer.terminated().digits();
        buffer.clear();
        decoder.finish_frame();

        let reading = WeightReading {
            digits,
            unit: context.unit,
            mode: context.mode,
            lock_flag: context.lock_flag,
        };
        debug!(
            "Emitting weight {:?} {:?} {:?} lock={}",
            digits.as_bstr(),
            reading.unit,
            reading.mode,
            reading.lock_flag
        );

        self.emitted_count = self.emitted_count.wrapping_add(1);
        reading
    }

    pub fn emitted_count(&self) -> u32 {
        self.emitted_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::decoder::{DecodeOutcome, DecoderState};
    use crate::types::{Mode, Unit};

    fn decode_frame(decoder: &mut FrameDecoder, emitter: &mut WeightEmitter, bytes: &[u8]) -> Vec<WeightReading> {
        let mut readings = Vec::new();
        for &b in bytes {
            if decoder.push(b) == DecodeOutcome::Complete {
                readings.push(emitter.emit(decoder));
            }
        }
        readings
    }

    #[test]
    fn test_single_reading_from_frame() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        let readings = decode_frame(&mut decoder, &mut emitter, b"\x0201234567KN\r");

        assert_eq!(readings.len(), 1);
        assert_eq!(&readings[0].digits, b"01234567");
        assert_eq!(readings[0].unit, Unit::Kilograms);
        assert_eq!(readings[0].mode, Mode::Net);
        assert_eq!(decoder.cursor(), 0);
        assert_eq!(decoder.state(), DecoderState::AwaitingStart);
    }

    #[test]
    fn test_buffer_cleared_after_emit() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        decode_frame(&mut decoder, &mut emitter, b"\x0201234567KN\r");
        assert!(decoder.buffer_mut().as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_identical_readings_emitted_again() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        let readings = decode_frame(&mut decoder, &mut emitter, b"\x02   12.50LG\r\x02   12.50LG\r");
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], readings[1]);
        assert_eq!(emitter.emitted_count(), 2);
    }

    #[test]
    fn test_short_frame_after_overflow_ignores_stale_digits() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        let mut stream = vec![0x02];
        stream.extend_from_slice(&[b'9'; 23]);
        stream.extend_from_slice(b"\x0212\r");

        let readings = decode_frame(&mut decoder, &mut emitter, &stream);
        assert_eq!(decoder.overflow_count(), 1);
        assert_eq!(readings.len(), 1);
        assert_eq!(&readings[0].digits, b"12\r\0\0\0\0\0");
    }

    #[test]
    fn test_garbage_before_start_marker() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        let readings = decode_frame(&mut decoder, &mut emitter, b"99\x02   -0.50KG\r");
        assert_eq!(readings.len(), 1);
        assert_eq!(&readings[0].digits, b"   -0.50");
    }

    #[test]
    fn test_payload_layout() {
        let mut decoder = FrameDecoder::new();
        let mut emitter = WeightEmitter::new();
        let readings = decode_frame(&mut decoder, &mut emitter, b"\x02  100.00KN\r");
        let payload = readings[0].to_payload();
        assert_eq!(&payload[..8], b"  100.00");
        assert_eq!(payload[8], b' ');
        assert_eq!(&payload[9..11], b"KG");
        assert_eq!(payload[11], b' ');
        assert_eq!(&payload[12..14], b"NT");
        assert_eq!(&payload[14..], b"\r\n\0");
    }
}
