//! Channel-major audio buffer.

use serde::{Deserialize, Serialize};

/// Multichannel float audio stored channel-major (one `Vec` per channel).
///
/// All channels always have the same number of frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl AudioBuffer {
    /// Create a zeroed buffer.
    pub fn new(num_channels: usize, num_frames: usize) -> Self {
        Self {
            channels: (0..num_channels).map(|_| vec![0.0; num_frames]).collect(),
            frames: if num_channels == 0 { 0 } else { num_frames },
        }
    }

    /// Build from per-channel sample vectors.
    ///
    /// Channels shorter than the longest one are zero-padded.
    pub fn from_channels(mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        for ch in &mut channels {
            ch.resize(frames, 0.0);
        }
        Self { channels, frames }
    }

    /// Build from interleaved samples.
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> Self {
        if num_channels == 0 {
            return Self::default();
        }
        let frames = samples.len() / num_channels;
        let mut channels: Vec<Vec<f32>> = (0..num_channels)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Self { channels, frames }
    }

    /// Mono buffer from a single channel of samples.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self::from_channels(vec![samples])
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    /// Channel `index`, or the last channel when `index` is past the end.
    ///
    /// Lets mono sources feed stereo destinations. Returns an empty slice
    /// for a buffer without channels.
    #[inline]
    pub fn channel_clamped(&self, index: usize) -> &[f32] {
        match self.channels.len() {
            0 => &[],
            n => &self.channels[index.min(n - 1)],
        }
    }

    #[inline]
    pub fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.channels[channel][frame]
    }

    #[inline]
    pub fn set_sample(&mut self, channel: usize, frame: usize, value: f32) {
        self.channels[channel][frame] = value;
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(Vec::as_mut_slice)
    }

    /// Zero every sample.
    pub fn clear(&mut self) {
        for ch in &mut self.channels {
            ch.fill(0.0);
        }
    }

    /// Zero `len` frames starting at `start` in every channel.
    pub fn clear_range(&mut self, start: usize, len: usize) {
        let end = (start + len).min(self.frames);
        if start >= end {
            return;
        }
        for ch in &mut self.channels {
            ch[start..end].fill(0.0);
        }
    }

    /// Mix `len` frames of `source` (starting at `source_start`, channels
    /// clamped) into this buffer at `dest_start`, scaled by `gain`.
    pub fn add_from(
        &mut self,
        dest_start: usize,
        source: &AudioBuffer,
        source_start: usize,
        len: usize,
        gain: f32,
    ) {
        if source.num_channels() == 0 {
            return;
        }
        let len = len
            .min(self.frames.saturating_sub(dest_start))
            .min(source.frames.saturating_sub(source_start));
        if len == 0 {
            return;
        }
        for (ch_idx, dest) in self.channels.iter_mut().enumerate() {
            let src = &source.channel_clamped(ch_idx)[source_start..source_start + len];
            for (d, s) in dest[dest_start..dest_start + len].iter_mut().zip(src) {
                *d += s * gain;
            }
        }
    }
}
