//! Slicing sampler engine.
//!
//! Loads a recording, cuts it into slices at detected onsets and plays the
//! slices polyphonically from note events, while a control thread edits the
//! slices with full undo.
//!
//! # Features
//!
//! - **Slicing**: spectral-flux onsets, manual taps, minimum-gap thinning
//! - **Editing**: boundary moves, deletion, per-slice gain / pitch / stretch /
//!   reverse, bounded undo and redo
//! - **Playback**: voice pool with envelope, low-pass filter and a pluggable
//!   time stretcher, choke and gate modes, recording preview
//! - **Loading**: one background loader thread, outcome polled by the caller
//!
//! # Example
//!
//! ```ignore
//! use padslicer_sampler::AudioEngine;
//! use padslicer_core::{AudioBuffer, MidiEvent, PlaybackParams};
//!
//! let engine = AudioEngine::builder().sample_rate(44100.0).build()?;
//! engine.load_file_async("break.wav")?;
//! let outcome = engine.wait_for_load();
//!
//! // Audio thread
//! let mut out = AudioBuffer::new(2, 512);
//! engine.render(&mut out, &[MidiEvent::note_on(0, 0, 36, 100)], &PlaybackParams::default());
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

// Engine (most common usage)
mod engine;
pub use engine::{AudioEngine, AudioEngineBuilder, EngineState, STATE_VERSION};

pub mod decode;
#[cfg(feature = "wav")]
pub use decode::WavDecoder;
pub use decode::{DecodedAudio, Decoder};

mod loader;
pub use loader::{LoadInfo, LoadOutcome};

pub mod history;
pub mod pool;
pub mod slices;
pub mod time_stretch;
pub mod voice;

pub use history::{History, DEFAULT_HISTORY_DEPTH};
pub use pool::SamplePool;
pub use slices::{Slice, SliceId, SliceSet, Snapshot};
pub use time_stretch::{
    GrainSize, GranularStretcher, LinearStretcher, StretchBackend, StretchParams, TimeStretcher,
};
pub use voice::PadVoice;
