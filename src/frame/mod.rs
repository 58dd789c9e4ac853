pub mod buffer;
pub mod decoder;
pub mod emitter;

pub use buffer::FrameBuffer;
pub use decoder::{classify, ByteAction, DecodeOutcome, DecoderState, FrameDecoder};
pub use emitter::WeightEmitter;
