//! Shared building blocks for the padslicer engine.
//!
//! - [`AudioBuffer`]: channel-major float audio
//! - [`MidiEvent`]: note events handed to the render callback
//! - [`AtomicFloat`] / [`AtomicFlag`]: lock-free state shared across threads
//! - [`ParameterLayout`] / [`ParameterRange`]: host parameters
//! - [`SliceControls`] / [`PlaybackParams`] / [`EngineConfig`]: configuration

pub mod error;
pub use error::{Error, Result};

pub mod buffer;
pub use buffer::AudioBuffer;

pub mod midi;
pub use midi::{MidiEvent, NoteAction};
pub use midi_msg::{Channel, ChannelVoiceMsg};

mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat};

pub mod parameter;
pub use parameter::{
    db_to_gain, gain_to_db, ParamId, ParameterDescriptor, ParameterLayout, ParameterRange,
    ParameterScale, MINUS_INFINITY_DB,
};

pub mod config;
pub use config::{EngineConfig, PlaybackParams, SliceControls};
