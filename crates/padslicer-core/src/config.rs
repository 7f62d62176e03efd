//! Engine configuration and the two parameter groups the engine consumes.
//!
//! [`SliceControls`] change how the recording is cut and are applied from
//! the control thread. [`PlaybackParams`] shape voices and are handed to
//! every render call.

use serde::{Deserialize, Serialize};

use crate::parameter::{db_to_gain, ParamId, ParameterLayout};
use crate::{Error, Result};

pub const MIN_SAMPLE_RATE: f64 = 8000.0;
pub const MAX_SAMPLE_RATE: f64 = 384000.0;

/// Static engine configuration, fixed between `prepare` calls.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// Largest block rendered in one pass. Larger host blocks are split.
    pub block_size: usize,
    pub voices: usize,
    pub waveform_bin_size: usize,
    pub history_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 512,
            voices: 32,
            waveform_bin_size: 1024,
            history_depth: 64,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;
        if self.block_size == 0 {
            return Err(Error::InvalidConfig("block_size must be at least 1".into()));
        }
        if self.voices == 0 {
            return Err(Error::InvalidConfig("voices must be at least 1".into()));
        }
        if self.waveform_bin_size == 0 {
            return Err(Error::InvalidConfig(
                "waveform_bin_size must be at least 1".into(),
            ));
        }
        if self.history_depth == 0 {
            return Err(Error::InvalidConfig(
                "history_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_sample_rate(sample_rate: f64) -> Result<()> {
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(Error::InvalidConfig(format!(
            "sample_rate {} out of range (8000-384000 Hz)",
            sample_rate
        )));
    }
    Ok(())
}

/// Parameters that decide where the recording is cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceControls {
    /// Trigger note of slice 0, 0-127.
    pub base_note: u8,
    /// 1-128.
    pub max_slices: usize,
    /// Onset threshold scale, 0.6-2.0.
    pub sensitivity: f32,
    /// Minimum distance between boundaries, 1-500 ms.
    pub min_gap_ms: f32,
}

impl Default for SliceControls {
    fn default() -> Self {
        Self {
            base_note: 36,
            max_slices: 64,
            sensitivity: 1.2,
            min_gap_ms: 30.0,
        }
    }
}

impl SliceControls {
    pub fn new(base_note: i32, max_slices: i32, sensitivity: f32, min_gap_ms: f32) -> Self {
        Self {
            base_note: base_note.clamp(0, 127) as u8,
            max_slices: max_slices.clamp(1, 128) as usize,
            sensitivity: finite_or(sensitivity, 1.2).clamp(0.6, 2.0),
            min_gap_ms: finite_or(min_gap_ms, 30.0).clamp(1.0, 500.0),
        }
    }

    /// Copy with every field forced into range.
    pub fn clamped(self) -> Self {
        Self::new(
            self.base_note as i32,
            self.max_slices.min(i32::MAX as usize) as i32,
            self.sensitivity,
            self.min_gap_ms,
        )
    }

    /// Minimum gap in samples, `round(ms / 1000 * sr)`, never below 1.
    pub fn min_gap_samples(&self, sample_rate: f64) -> usize {
        let samples = (self.min_gap_ms as f64 / 1000.0 * sample_rate).round();
        (samples as usize).max(1)
    }

    /// Map normalized host values onto real units.
    pub fn from_normalized(layout: &ParameterLayout, value: impl Fn(ParamId) -> f32) -> Self {
        let real = |id| layout.range(id).denormalize(value(id));
        Self::new(
            real(ParamId::BaseNote) as i32,
            real(ParamId::MaxSlices) as i32,
            real(ParamId::Sensitivity),
            real(ParamId::MinGapMs),
        )
    }
}

/// Voice shaping applied on every render call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackParams {
    /// Seconds, 0.001-0.5.
    pub attack: f32,
    /// Seconds, 0.005-2.0.
    pub release: f32,
    /// Hz, 40-18000.
    pub cutoff: f32,
    /// 0.1-2.0.
    pub resonance: f32,
    /// -24 to +24 dB.
    pub master_gain_db: f32,
    /// A new note silences every sounding voice.
    pub choke: bool,
    /// Note-off releases voices playing that note.
    pub gate: bool,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            release: 0.2,
            cutoff: 12000.0,
            resonance: 0.7,
            master_gain_db: 0.0,
            choke: false,
            gate: false,
        }
    }
}

impl PlaybackParams {
    /// Copy with every field forced into range. NaN falls back to the default.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        Self {
            attack: finite_or(self.attack, d.attack).clamp(0.001, 0.5),
            release: finite_or(self.release, d.release).clamp(0.005, 2.0),
            cutoff: finite_or(self.cutoff, d.cutoff).clamp(40.0, 18000.0),
            resonance: finite_or(self.resonance, d.resonance).clamp(0.1, 2.0),
            master_gain_db: finite_or(self.master_gain_db, d.master_gain_db).clamp(-24.0, 24.0),
            choke: self.choke,
            gate: self.gate,
        }
    }

    #[inline]
    pub fn master_gain(&self) -> f32 {
        db_to_gain(self.master_gain_db)
    }

    pub fn from_normalized(layout: &ParameterLayout, value: impl Fn(ParamId) -> f32) -> Self {
        let real = |id| layout.range(id).denormalize(value(id));
        Self {
            attack: real(ParamId::Attack),
            release: real(ParamId::Release),
            cutoff: real(ParamId::Cutoff),
            resonance: real(ParamId::Resonance),
            master_gain_db: real(ParamId::Gain),
            choke: real(ParamId::Choke) >= 0.5,
            gate: real(ParamId::Gate) >= 0.5,
        }
        .clamped()
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else if value.is_nan() {
        fallback
    } else {
        // Infinities clamp to the matching end of the range.
        value.signum() * f32::MAX
    }
}
