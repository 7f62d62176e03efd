//! Per-voice playback: envelope, low-pass filter and the pad voice itself.

mod envelope;
mod filter;
mod pad;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::LowPassFilter;
pub use pad::PadVoice;
