//! Varispeed resampler.
//!
//! Reads the source at `2^(pitch/12) / time_ratio` samples per output sample
//! with linear interpolation. Pitch and duration move together. The
//! fractional read phase is carried between calls so consecutive blocks
//! line up exactly.

use padslicer_core::AudioBuffer;

use super::{read_interpolated, StretchParams, TimeStretcher};

#[derive(Debug, Clone, Default)]
pub struct LinearStretcher {
    params: StretchParams,
    rate: f64,
    phase: f64,
}

impl LinearStretcher {
    pub fn new() -> Self {
        Self {
            params: StretchParams::default(),
            rate: 1.0,
            phase: 0.0,
        }
    }

    pub fn params(&self) -> StretchParams {
        self.params
    }

    /// Source samples read per output sample.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl TimeStretcher for LinearStretcher {
    fn configure(&mut self, time_ratio: f32, pitch_semitones: f32) {
        self.params = StretchParams::new(time_ratio, pitch_semitones);
        self.rate = self.params.varispeed_rate();
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn process(
        &mut self,
        source: &AudioBuffer,
        start: usize,
        num_out: usize,
        destination: &mut AudioBuffer,
    ) -> usize {
        let num_out = num_out.min(destination.num_frames());
        if num_out == 0 {
            return 0;
        }
        if source.is_empty() || source.num_channels() == 0 {
            for ch in destination.channels_mut() {
                ch[..num_out].fill(0.0);
            }
            return 0;
        }

        let origin = start as f64 + self.phase;
        for (ch_idx, out) in destination.channels_mut().enumerate() {
            let samples = source.channel_clamped(ch_idx);
            let mut pos = origin;
            for sample in &mut out[..num_out] {
                *sample = read_interpolated(samples, pos);
                pos += self.rate;
            }
        }

        let advanced = self.phase + num_out as f64 * self.rate;
        let consumed = advanced.floor().max(0.0);
        self.phase = advanced - consumed;
        consumed as usize
    }
}
