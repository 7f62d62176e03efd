//! # padslicer - real-time slicing sampler core
//!
//! Loads a recording, cuts it into slices at detected onsets, maps the
//! slices to notes and plays them from a real-time callback while the
//! slices are edited live.
//!
//! ## Architecture
//!
//! padslicer is an umbrella crate over:
//! - **padslicer-core** - audio buffers, note events, lock-free atomics,
//!   parameter layout, configuration
//! - **padslicer-analysis** - spectral-flux onset slicer, waveform overview
//! - **padslicer-sampler** - the engine: slice editing with undo, pad voices,
//!   time stretch, background loading, state blob
//!
//! ## Quick Start
//!
//! ```ignore
//! use padslicer::prelude::*;
//!
//! let engine = AudioEngine::builder()
//!     .sample_rate(44100.0)
//!     .block_size(512)
//!     .build()?;
//!
//! engine.load_file("break.wav")?;
//! engine.set_slice_controls(36, 16, 1.2);
//! engine.move_boundary(2, 20_000)?;
//!
//! // Audio thread
//! let mut out = AudioBuffer::new(2, 512);
//! let notes = [MidiEvent::note_on(0, 0, 37, 100)];
//! engine.render(&mut out, &notes, &PlaybackParams::default());
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - WAV decoding
//! - `wav` - built-in WAV decoder (`hound`)
//! - `serialization` - serde derives on analysis output

/// Re-export of padslicer-core for direct access
pub use padslicer_core as core;

/// Re-export of padslicer-analysis
pub use padslicer_analysis as analysis;

/// Re-export of padslicer-sampler
pub use padslicer_sampler as sampler;

pub mod error;
pub use error::{Error, Result};

// Core types
pub use padslicer_core::{
    AtomicFlag,
    // Lock-free primitives
    AtomicFloat,
    // Audio data
    AudioBuffer,
    // Configuration
    EngineConfig,
    // Note events
    MidiEvent,
    NoteAction,
    // Host parameters
    ParamId,
    ParameterLayout,
    ParameterRange,
    PlaybackParams,
    SliceControls,
};

// Analysis
pub use padslicer_analysis::{SpectralFluxSlicer, WaveformCache};

// Engine
pub use padslicer_sampler::{
    AudioEngine, AudioEngineBuilder, DecodedAudio, Decoder, EngineState, GrainSize, LoadInfo,
    LoadOutcome, SamplePool, Slice, SliceId, StretchBackend, TimeStretcher,
};

#[cfg(feature = "wav")]
pub use padslicer_sampler::WavDecoder;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{AudioEngine, AudioEngineBuilder};

    // Essential types
    pub use crate::core::{AudioBuffer, MidiEvent, PlaybackParams, SliceControls};

    // Slices and loading
    pub use crate::sampler::{LoadOutcome, Slice, StretchBackend};

    // Errors
    pub use crate::{Error, Result};
}
