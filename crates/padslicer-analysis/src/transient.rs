//! Spectral-flux onset slicing.
//!
//! The slicer computes a novelty curve (positive spectral flux between
//! consecutive Hann-windowed FFT frames), picks peaks that rise above a local
//! moving mean scaled by the sensitivity, and turns them into sample-index
//! boundaries.
//!
//! ```
//! use padslicer_analysis::SpectralFluxSlicer;
//! use padslicer_core::AudioBuffer;
//!
//! let buffer = AudioBuffer::mono(vec![0.0; 44100]);
//! let mut slicer = SpectralFluxSlicer::new();
//! let boundaries = slicer.slice(&buffer, 0, 16);
//! assert_eq!(boundaries, vec![0]);
//! ```

use std::sync::Arc;

use padslicer_core::AudioBuffer;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// log2 of the default FFT size (4096).
pub const DEFAULT_FFT_ORDER: u32 = 12;

pub const DEFAULT_HOP_SIZE: usize = 512;

pub const DEFAULT_LOCAL_WINDOW: usize = 16;

pub const DEFAULT_SENSITIVITY: f32 = 1.2;

/// Peaks at or before this sample index are dropped; 0 is always a boundary.
const MIN_ONSET_SAMPLE: usize = 200;

/// Onset detector that cuts a buffer into slice boundaries.
pub struct SpectralFluxSlicer {
    fft_size: usize,
    hop_size: usize,
    local_window: usize,
    threshold_scale: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    frame: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    prev_magnitudes: Vec<f32>,
}

impl std::fmt::Debug for SpectralFluxSlicer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralFluxSlicer")
            .field("fft_size", &self.fft_size)
            .field("hop_size", &self.hop_size)
            .field("local_window", &self.local_window)
            .field("threshold_scale", &self.threshold_scale)
            .finish()
    }
}

impl Default for SpectralFluxSlicer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralFluxSlicer {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_FFT_ORDER, DEFAULT_HOP_SIZE)
    }

    /// FFT size is `2^fft_order` (order clamped to 6..=16); hop is at least 64.
    pub fn with_params(fft_order: u32, hop_size: usize) -> Self {
        let fft_size = 1usize << fft_order.clamp(6, 16);
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        Self {
            fft_size,
            hop_size: hop_size.max(64),
            local_window: DEFAULT_LOCAL_WINDOW,
            threshold_scale: DEFAULT_SENSITIVITY,
            fft,
            window: hann_window(fft_size),
            frame: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            magnitudes: vec![0.0; fft_size / 2],
            prev_magnitudes: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Peak threshold multiplier over the local mean (the sensitivity control).
    pub fn set_threshold_scale(&mut self, scale: f32) {
        self.threshold_scale = scale;
    }

    pub fn threshold_scale(&self) -> f32 {
        self.threshold_scale
    }

    /// Radius of the moving mean in novelty frames, clamped to 4..=128.
    pub fn set_local_window(&mut self, radius: usize) {
        self.local_window = radius.clamp(4, 128);
    }

    pub fn local_window(&self) -> usize {
        self.local_window
    }

    pub fn set_hop_size(&mut self, hop_size: usize) {
        self.hop_size = hop_size.max(64);
    }

    /// Ordered boundaries for `buffer`, starting with 0, at most
    /// `target_count` entries.
    ///
    /// `channel` past the last channel reads the last channel.
    pub fn slice(&mut self, buffer: &AudioBuffer, channel: usize, target_count: usize) -> Vec<usize> {
        let novelty = self.novelty(buffer, channel);
        let peaks = self.pick_peaks(&novelty);

        let mut out = Vec::with_capacity(peaks.len() + 1);
        out.push(0);
        out.extend(
            peaks
                .into_iter()
                .map(|frame| frame * self.hop_size)
                .filter(|&sample| sample > MIN_ONSET_SAMPLE),
        );

        decimate(out, target_count.max(1))
    }

    /// Positive spectral flux per hop. Empty for buffers shorter than one FFT.
    pub fn novelty(&mut self, buffer: &AudioBuffer, channel: usize) -> Vec<f32> {
        let samples = buffer.channel_clamped(channel);
        if samples.len() < self.fft_size {
            return Vec::new();
        }

        self.prev_magnitudes.fill(0.0);
        let mut novelty = Vec::with_capacity((samples.len() - self.fft_size) / self.hop_size + 1);

        let mut pos = 0;
        while pos + self.fft_size < samples.len() {
            let input = &samples[pos..pos + self.fft_size];
            for ((bin, &s), &w) in self.frame.iter_mut().zip(input).zip(&self.window) {
                *bin = Complex::new(s * w, 0.0);
            }
            self.fft
                .process_with_scratch(&mut self.frame, &mut self.scratch);

            for (mag, bin) in self.magnitudes.iter_mut().zip(&self.frame) {
                *mag = bin.norm();
            }

            let mut flux = 0.0;
            for (prev, &mag) in self.prev_magnitudes.iter_mut().zip(&self.magnitudes) {
                let diff = mag - *prev;
                if diff > 0.0 {
                    flux += diff;
                }
                *prev = mag;
            }
            novelty.push(flux);

            pos += self.hop_size;
        }

        novelty
    }

    /// Frames whose novelty beats the scaled local mean and both neighbors.
    fn pick_peaks(&self, novelty: &[f32]) -> Vec<usize> {
        let n = novelty.len();
        if n < 3 {
            return Vec::new();
        }

        let w = self.local_window as isize;
        let last = (n - 1) as isize;
        let count = (2 * w + 1) as f32;

        (1..n - 1)
            .filter(|&i| {
                let sum: f32 = (-w..=w)
                    .map(|k| novelty[(i as isize + k).clamp(0, last) as usize])
                    .sum();
                let threshold = sum / count * self.threshold_scale;
                let value = novelty[i];
                value > threshold && value > novelty[i - 1] && value > novelty[i + 1]
            })
            .collect()
    }
}

/// Stride-decimate to exactly `target` entries when there are more.
fn decimate(boundaries: Vec<usize>, target: usize) -> Vec<usize> {
    let len = boundaries.len();
    if len <= target {
        return boundaries;
    }
    let stride = len as f32 / target as f32;
    (0..target)
        .map(|i| {
            let idx = ((i as f32 * stride).round() as usize).min(len - 1);
            boundaries[idx]
        })
        .collect()
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32;
            0.5 * (1.0 - angle.cos())
        })
        .collect()
}
