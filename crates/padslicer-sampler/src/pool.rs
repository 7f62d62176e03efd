//! The loaded recording and its waveform overview.

use padslicer_analysis::{WaveformCache, DEFAULT_SAMPLES_PER_BIN};
use padslicer_core::AudioBuffer;

use crate::decode::DecodedAudio;

const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Holds the decoded recording the engine slices and plays.
#[derive(Debug, Clone)]
pub struct SamplePool {
    buffer: AudioBuffer,
    sample_rate: f64,
    name: String,
    waveform: WaveformCache,
    samples_per_bin: usize,
}

impl Default for SamplePool {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_BIN)
    }
}

impl SamplePool {
    pub fn new(samples_per_bin: usize) -> Self {
        Self {
            buffer: AudioBuffer::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            name: String::new(),
            waveform: WaveformCache::default(),
            samples_per_bin: samples_per_bin.max(1),
        }
    }

    /// Take ownership of a decoded recording and build its overview.
    pub fn load(&mut self, decoded: DecodedAudio) {
        self.waveform = WaveformCache::build(&decoded.buffer, self.samples_per_bin);
        self.buffer = decoded.buffer;
        self.sample_rate = decoded.sample_rate;
        self.name = decoded.name;
    }

    pub fn clear(&mut self) {
        self.buffer = AudioBuffer::default();
        self.sample_rate = DEFAULT_SAMPLE_RATE;
        self.name.clear();
        self.waveform = WaveformCache::default();
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waveform(&self) -> &WaveformCache {
        &self.waveform
    }

    /// Length in frames.
    pub fn len(&self) -> usize {
        self.buffer.num_frames()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
