//! Waveform overview for drawing a loaded recording.
//!
//! Each bin stores the min and max of the channel-averaged absolute sample
//! value over `samples_per_bin` frames.

use padslicer_core::AudioBuffer;

pub const DEFAULT_SAMPLES_PER_BIN: usize = 1024;

/// Min/max of one bin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformBin {
    pub min: f32,
    pub max: f32,
}

/// Coarse min/max summary of a buffer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformCache {
    bins: Vec<WaveformBin>,
    samples_per_bin: usize,
}

impl WaveformCache {
    /// Summarize `buffer` into `max(1, frames / samples_per_bin)` bins.
    ///
    /// Frames past the last whole bin are not covered; a buffer shorter than
    /// one bin yields a single short bin. An empty buffer yields no bins.
    pub fn build(buffer: &AudioBuffer, samples_per_bin: usize) -> Self {
        let samples_per_bin = samples_per_bin.max(1);
        let frames = buffer.num_frames();
        let channels = buffer.num_channels();
        if frames == 0 || channels == 0 {
            return Self {
                bins: Vec::new(),
                samples_per_bin,
            };
        }

        let num_bins = (frames / samples_per_bin).max(1);
        let mut bins = Vec::with_capacity(num_bins);

        for bin in 0..num_bins {
            let start = bin * samples_per_bin;
            let end = (start + samples_per_bin).min(frames);

            let mut min = f32::MAX;
            let mut max = f32::MIN;
            for frame in start..end {
                let sum: f32 = buffer.channels().map(|ch| ch[frame].abs()).sum();
                let value = sum / channels as f32;
                min = min.min(value);
                max = max.max(value);
            }
            bins.push(WaveformBin { min, max });
        }

        Self {
            bins,
            samples_per_bin,
        }
    }

    pub fn bins(&self) -> &[WaveformBin] {
        &self.bins
    }

    /// Bins as `(min, max)` pairs.
    pub fn to_pairs(&self) -> Vec<(f32, f32)> {
        self.bins.iter().map(|b| (b.min, b.max)).collect()
    }

    pub fn samples_per_bin(&self) -> usize {
        self.samples_per_bin
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Loudest bin maximum, 0 when empty.
    pub fn peak(&self) -> f32 {
        self.bins.iter().map(|b| b.max).fold(0.0f32, f32::max)
    }
}
