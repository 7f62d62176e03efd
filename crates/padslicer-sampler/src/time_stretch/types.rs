//! Time-stretch and pitch-shift settings.

use serde::{Deserialize, Serialize};

/// Per-slice stretch settings.
///
/// ## Range Limits
///
/// - `time_ratio`: 0.25 - 4.0 (2.0 plays twice as long)
/// - `pitch_semitones`: -24 to +24
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StretchParams {
    pub time_ratio: f32,
    pub pitch_semitones: f32,
}

impl StretchParams {
    pub const MIN_TIME_RATIO: f32 = 0.25;
    pub const MAX_TIME_RATIO: f32 = 4.0;
    pub const MIN_PITCH: f32 = -24.0;
    pub const MAX_PITCH: f32 = 24.0;

    /// Clamped settings. NaN falls back to no change.
    pub fn new(time_ratio: f32, pitch_semitones: f32) -> Self {
        Self {
            time_ratio: clamp_time_ratio(time_ratio),
            pitch_semitones: clamp_pitch(pitch_semitones),
        }
    }

    /// True unless both settings are at their neutral value.
    pub fn is_active(&self) -> bool {
        (self.time_ratio - 1.0).abs() > 0.001 || self.pitch_semitones.abs() > 0.005
    }

    /// Frequency ratio of the pitch shift, `2^(semitones / 12)`.
    #[inline]
    pub fn pitch_ratio(&self) -> f64 {
        2.0_f64.powf(self.pitch_semitones as f64 / 12.0)
    }

    /// Source samples read per output sample when pitch and time are
    /// coupled (varispeed).
    #[inline]
    pub fn varispeed_rate(&self) -> f64 {
        self.pitch_ratio() / (self.time_ratio as f64).max(1.0e-4)
    }

    /// Source samples consumed per output sample when pitch is independent.
    #[inline]
    pub fn source_advance(&self) -> f64 {
        1.0 / (self.time_ratio as f64).max(1.0e-4)
    }
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            time_ratio: 1.0,
            pitch_semitones: 0.0,
        }
    }
}

pub fn clamp_time_ratio(ratio: f32) -> f32 {
    if ratio.is_nan() {
        return 1.0;
    }
    ratio.clamp(StretchParams::MIN_TIME_RATIO, StretchParams::MAX_TIME_RATIO)
}

pub fn clamp_pitch(semitones: f32) -> f32 {
    if semitones.is_nan() {
        return 0.0;
    }
    semitones.clamp(StretchParams::MIN_PITCH, StretchParams::MAX_PITCH)
}

/// Grain size presets for the granular backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrainSize {
    /// 10ms - tighter transients
    Small,
    /// 25ms
    #[default]
    Medium,
    /// 50ms - smoother sustained sounds
    Large,
}

impl GrainSize {
    /// Grain length in samples at `sample_rate`, rounded down to an even
    /// count and never below 16.
    pub fn samples(&self, sample_rate: f64) -> usize {
        let ms = match self {
            GrainSize::Small => 10.0,
            GrainSize::Medium => 25.0,
            GrainSize::Large => 50.0,
        };
        let len = (sample_rate * ms / 1000.0) as usize;
        (len & !1).max(16)
    }
}
