//! Time-stretching and pitch-shifting for slice playback.
//!
//! A [`TimeStretcher`] renders a block of output from a source buffer
//! starting at a sample position and reports how many source samples it
//! consumed, so the caller can advance its playhead. Backends:
//!
//! - [`LinearStretcher`]: varispeed resampling, pitch and time coupled
//! - [`GranularStretcher`]: Hann-windowed grains, pitch and time independent
//!
//! The backend is picked at engine build time with [`StretchBackend`].
//!
//! # RT-Safety
//!
//! `process` does not allocate. Any scratch state is sized in `prepare`.

mod granular;
mod linear;
mod types;

pub use granular::GranularStretcher;
pub use linear::LinearStretcher;
pub use types::{clamp_pitch, clamp_time_ratio, GrainSize, StretchParams};

use padslicer_core::AudioBuffer;

/// Renders stretched / pitch-shifted audio from a source buffer.
pub trait TimeStretcher: Send {
    /// Called off the render thread before playback.
    fn prepare(&mut self, _sample_rate: f64, _max_block: usize) {}

    /// Set the stretch for the next note. Values are clamped.
    fn configure(&mut self, time_ratio: f32, pitch_semitones: f32);

    /// Forget any carried phase or grain state.
    fn reset(&mut self);

    /// Write `num_out` frames into every channel of `destination` (from frame
    /// 0) reading `source` from `start`. Destination channel `c` reads source
    /// channel `min(c, channels - 1)`; reads past the end of `source` repeat
    /// its last frame.
    ///
    /// Returns the number of whole source samples consumed.
    fn process(
        &mut self,
        source: &AudioBuffer,
        start: usize,
        num_out: usize,
        destination: &mut AudioBuffer,
    ) -> usize;
}

/// Which stretcher every voice gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StretchBackend {
    #[default]
    Linear,
    Granular(GrainSize),
}

impl StretchBackend {
    pub fn create(&self, sample_rate: f64, max_block: usize) -> Box<dyn TimeStretcher> {
        let mut stretcher: Box<dyn TimeStretcher> = match self {
            StretchBackend::Linear => Box::new(LinearStretcher::new()),
            StretchBackend::Granular(size) => Box::new(GranularStretcher::new(*size, sample_rate)),
        };
        stretcher.prepare(sample_rate, max_block);
        stretcher
    }
}

/// Linear interpolation at fractional position `pos`, clamped to the buffer.
#[inline]
pub(crate) fn read_interpolated(samples: &[f32], pos: f64) -> f32 {
    let last = samples.len() - 1;
    if pos <= 0.0 {
        return samples[0];
    }
    let i0 = (pos.floor() as usize).min(last);
    let i1 = (i0 + 1).min(last);
    let frac = (pos - i0 as f64).clamp(0.0, 1.0) as f32;
    let s0 = samples[i0];
    s0 + (samples[i1] - s0) * frac
}
