//! Granular time-stretching with independent pitch.
//!
//! ## Algorithm Overview
//!
//! 1. **Grain scheduling**: a grain starts every `hop = grain / 2` output
//!    samples; its source onset advances by `hop / time_ratio`
//! 2. **Grain playback**: each grain reads the source at the pitch ratio,
//!    linearly interpolated
//! 3. **Overlap-add**: periodic Hann windows at 50% overlap sum to one, so
//!    two grains cover every output sample
//!
//! Grain state is derived from an output clock and a carried fractional
//! source phase, so nothing is buffered between calls and `process` never
//! allocates.

use std::f32::consts::PI;

use padslicer_core::AudioBuffer;

use super::{read_interpolated, GrainSize, StretchParams, TimeStretcher};

/// Overlap-add grain stretcher.
#[derive(Debug, Clone)]
pub struct GranularStretcher {
    preset: GrainSize,
    sample_rate: f64,
    grain_size: usize,
    hop_size: usize,
    window: Vec<f32>,

    params: StretchParams,
    pitch_ratio: f64,
    source_advance: f64,

    /// Output samples rendered since the last reset.
    clock: u64,
    /// Fractional source position carried past the last consumed sample.
    phase: f64,
}

impl GranularStretcher {
    pub fn new(grain_size: GrainSize, sample_rate: f64) -> Self {
        let size = grain_size.samples(sample_rate);
        Self {
            preset: grain_size,
            sample_rate,
            grain_size: size,
            hop_size: size / 2,
            window: periodic_hann(size),
            params: StretchParams::default(),
            pitch_ratio: 1.0,
            source_advance: 1.0,
            clock: 0,
            phase: 0.0,
        }
    }

    fn resize_grains(&mut self) {
        let size = self.preset.samples(self.sample_rate);
        self.grain_size = size;
        self.hop_size = size / 2;
        self.window = periodic_hann(size);
    }

    pub fn grain_size(&self) -> usize {
        self.grain_size
    }

    pub fn params(&self) -> StretchParams {
        self.params
    }

    /// Output sample `t` (absolute clock) for one source channel. `origin`
    /// is the source position of clock value `self.clock`.
    #[inline]
    fn render_sample(&self, samples: &[f32], origin: f64, t: u64) -> f32 {
        let hop = self.hop_size as u64;
        let newest = t / hop;

        // Before the second grain starts only grain 0 sounds; play it
        // unwindowed so note onsets are not faded in.
        if newest == 0 {
            let onset = self.grain_onset(origin, 0);
            return read_interpolated(samples, onset + t as f64 * self.pitch_ratio);
        }

        let mut out = 0.0;
        for grain in [newest - 1, newest] {
            let offset = (t - grain * hop) as usize;
            let onset = self.grain_onset(origin, grain);
            let pos = onset + offset as f64 * self.pitch_ratio;
            out += read_interpolated(samples, pos) * self.window[offset];
        }
        out
    }

    /// Source position where `grain` begins reading.
    #[inline]
    fn grain_onset(&self, origin: f64, grain: u64) -> f64 {
        let start_time = (grain * self.hop_size as u64) as f64;
        origin + (start_time - self.clock as f64) * self.source_advance
    }
}

impl TimeStretcher for GranularStretcher {
    fn prepare(&mut self, sample_rate: f64, _max_block: usize) {
        if (self.sample_rate - sample_rate).abs() > 0.1 {
            self.sample_rate = sample_rate;
            self.resize_grains();
        }
        self.reset();
    }

    fn configure(&mut self, time_ratio: f32, pitch_semitones: f32) {
        self.params = StretchParams::new(time_ratio, pitch_semitones);
        self.pitch_ratio = self.params.pitch_ratio();
        self.source_advance = self.params.source_advance();
    }

    fn reset(&mut self) {
        self.clock = 0;
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
        for ch_idx in 0..destination.num_channels() {
            let samples = source.channel_clamped(ch_idx);
            for i in 0..num_out {
                let value = self.render_sample(samples, origin, self.clock + i as u64);
                destination.set_sample(ch_idx, i, value);
            }
        }

        self.clock += num_out as u64;
        let advanced = self.phase + num_out as f64 * self.source_advance;
        let consumed = advanced.floor().max(0.0);
        self.phase = advanced - consumed;
        consumed as usize
    }
}

fn periodic_hann(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
