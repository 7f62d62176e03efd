//! Builder for configuring and constructing an [`AudioEngine`].

use std::sync::Arc;

use padslicer_analysis::SpectralFluxSlicer;
use padslicer_core::{AtomicFlag, AtomicFloat, EngineConfig, PlaybackParams, SliceControls};
use parking_lot::Mutex;

use super::preview::Preview;
use super::{AudioEngine, EngineData, Shared};
use crate::decode::Decoder;
use crate::history::History;
use crate::loader::Loader;
use crate::pool::SamplePool;
use crate::slices::SliceSet;
use crate::time_stretch::StretchBackend;
use crate::voice::PadVoice;
use crate::Result;

/// # Example
///
/// ```ignore
/// use padslicer_sampler::{AudioEngine, StretchBackend, GrainSize};
///
/// let engine = AudioEngine::builder()
///     .sample_rate(48000.0)
///     .block_size(256)
///     .voices(16)
///     .stretch_backend(StretchBackend::Granular(GrainSize::Medium))
///     .build()?;
/// ```
pub struct AudioEngineBuilder {
    config: EngineConfig,
    channels: usize,
    backend: StretchBackend,
    decoder: Option<Box<dyn Decoder>>,
    controls: SliceControls,
}

impl Default for AudioEngineBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            channels: 2,
            backend: StretchBackend::default(),
            decoder: None,
            controls: SliceControls::default(),
        }
    }
}

impl AudioEngineBuilder {
    /// Default: 44100. Must be within 8000-384000.
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 512
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Default: 32
    pub fn voices(mut self, voices: usize) -> Self {
        self.config.voices = voices;
        self
    }

    /// Output channels each voice renders. Default: 2
    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn stretch_backend(mut self, backend: StretchBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Replaces the built-in WAV decoder.
    pub fn decoder(mut self, decoder: Box<dyn Decoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Default: 1024
    pub fn waveform_bin_size(mut self, samples_per_bin: usize) -> Self {
        self.config.waveform_bin_size = samples_per_bin;
        self
    }

    /// Default: 64
    pub fn history_depth(mut self, depth: usize) -> Self {
        self.config.history_depth = depth;
        self
    }

    /// Initial slice controls. Out-of-range values are clamped.
    pub fn slice_controls(mut self, controls: SliceControls) -> Self {
        self.controls = controls;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<AudioEngine> {
        self.config.validate()?;
        if self.channels == 0 {
            return Err(padslicer_core::Error::InvalidConfig(
                "channels must be at least 1".into(),
            )
            .into());
        }
        let decoder = match self.decoder {
            Some(decoder) => decoder,
            None => default_decoder()?,
        };

        let EngineConfig {
            sample_rate,
            block_size,
            voices,
            waveform_bin_size,
            history_depth,
        } = self.config;
        let controls = self.controls.clamped();

        let data = EngineData {
            pool: SamplePool::new(waveform_bin_size),
            slices: SliceSet::new(),
            history: History::new(history_depth),
            controls,
            onsets: Vec::new(),
            min_gap: controls.min_gap_samples(sample_rate),
            sample_rate,
            block_size,
            voices: (0..voices)
                .map(|_| PadVoice::new(self.backend, sample_rate, block_size, self.channels))
                .collect(),
            preview: Preview::default(),
            params: PlaybackParams::default(),
            source_path: None,
            pending_restore: None,
        };

        Ok(AudioEngine {
            shared: Arc::new(Shared {
                data: Mutex::new(data),
                loading: AtomicFlag::new(false),
                preview_position: AtomicFloat::new(0.0),
                decoder,
                slicer: Mutex::new(SpectralFluxSlicer::new()),
            }),
            loader: Mutex::new(Loader::new()),
            backend: self.backend,
            channels: self.channels,
        })
    }
}

#[cfg(feature = "wav")]
fn default_decoder() -> Result<Box<dyn Decoder>> {
    Ok(Box::new(crate::decode::WavDecoder))
}

#[cfg(not(feature = "wav"))]
fn default_decoder() -> Result<Box<dyn Decoder>> {
    Err(padslicer_core::Error::InvalidConfig(
        "no decoder configured and the `wav` feature is disabled".into(),
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_stretch::GrainSize;

    #[test]
    fn test_defaults() {
        let engine = AudioEngine::builder().build().unwrap();
        assert_eq!(engine.engine_sample_rate(), 44100.0);
        assert_eq!(engine.min_gap_samples(), 1323);
        assert_eq!(engine.slice_controls(), SliceControls::default());
        assert_eq!(engine.stretch_backend(), StretchBackend::Linear);
        assert_eq!(engine.total_length_samples(), 0);
        assert!(engine.slices().is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(AudioEngine::builder().sample_rate(100.0).build().is_err());
        assert!(AudioEngine::builder().block_size(0).build().is_err());
        assert!(AudioEngine::builder().voices(0).build().is_err());
        assert!(AudioEngine::builder().channels(0).build().is_err());
        assert!(AudioEngine::builder().history_depth(0).build().is_err());
    }

    #[test]
    fn test_custom_settings() {
        let engine = AudioEngine::builder()
            .sample_rate(48000.0)
            .stretch_backend(StretchBackend::Granular(GrainSize::Small))
            .slice_controls(SliceControls {
                min_gap_ms: 10.0,
                max_slices: 500,
                ..SliceControls::default()
            })
            .build()
            .unwrap();

        assert_eq!(engine.min_gap_samples(), 480);
        assert_eq!(engine.slice_controls().max_slices, 128);
        assert_eq!(
            engine.stretch_backend(),
            StretchBackend::Granular(GrainSize::Small)
        );
    }
}
