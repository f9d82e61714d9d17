pub mod batcher;
pub mod compressor;
pub mod encoder;
pub mod signal_generator;

pub use batcher::FrameBatcher;
pub use compressor::{decompress, FrameCompressor};
pub use encoder::{FrameEncoder, SAMPLE_RECORD_SIZE};
pub use signal_generator::{Oscillator, SignalGenerator};
