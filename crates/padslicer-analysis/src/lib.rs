//! # padslicer analysis
//!
//! Offline analysis of a loaded recording:
//! - **Waveform overview**: min/max bins for drawing
//! - **Onset slicing**: spectral-flux boundaries for cutting the recording
//!
//! Both work on a [`padslicer_core::AudioBuffer`] and run on the control or
//! loader thread, never in the render callback.
//!
//! ## Example
//!
//! ```rust
//! use padslicer_analysis::{SpectralFluxSlicer, WaveformCache};
//! use padslicer_core::AudioBuffer;
//!
//! let buffer = AudioBuffer::mono(vec![0.0; 44100]);
//!
//! let overview = WaveformCache::build(&buffer, 1024);
//! assert_eq!(overview.len(), 43);
//!
//! let mut slicer = SpectralFluxSlicer::new();
//! slicer.set_threshold_scale(1.2);
//! let boundaries = slicer.slice(&buffer, 0, 64);
//! assert_eq!(boundaries[0], 0);
//! ```

pub mod transient;
pub mod waveform;

pub use transient::SpectralFluxSlicer;
pub use waveform::{WaveformBin, WaveformCache, DEFAULT_SAMPLES_PER_BIN};
