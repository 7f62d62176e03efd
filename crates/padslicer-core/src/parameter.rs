//! Host parameter ranges and the sampler's parameter layout.
//!
//! Hosts automate in normalized 0.0-1.0 space; every parameter carries a
//! [`ParameterRange`] that maps between that space and real units.
//!
//! ```
//! use padslicer_core::{ParamId, ParameterLayout};
//!
//! let layout = ParameterLayout::new();
//! let cutoff = layout.range(ParamId::Cutoff);
//! assert_eq!(cutoff.default, 12000.0);
//!
//! let hz = cutoff.denormalize(cutoff.default_normalized());
//! assert!((hz - 12000.0).abs() < 0.5);
//! ```

/// Gains at or below this level are treated as silence.
pub const MINUS_INFINITY_DB: f32 = -100.0;

/// Decibels to linear gain, with everything at or below -100 dB mapping to 0.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db > MINUS_INFINITY_DB {
        10.0_f32.powf(db / 20.0)
    } else {
        0.0
    }
}

/// Linear gain to decibels, floored at -100 dB.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    } else {
        MINUS_INFINITY_DB
    }
}

/// How a parameter value is mapped between normalized and real space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParameterScale {
    /// `real = min + n * (max - min)`
    #[default]
    Linear,

    /// Skewed mapping, `real = min + n^(1/skew) * (max - min)`.
    ///
    /// `skew < 1.0` spends more of the normalized range on the low end,
    /// which suits times and frequencies.
    Skewed { skew: f32 },

    /// Off below 0.5, on from 0.5. Denormalizes to `min` or `max`.
    Toggle,

    /// Rounded to whole steps between `min` and `max`.
    Integer,
}

/// Real-valued range, default and scaling of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    pub min: f32,
    pub max: f32,
    /// Default real value, clamped into `min..=max`.
    pub default: f32,
    pub scale: ParameterScale,
}

impl ParameterRange {
    pub fn new(min: f32, max: f32, default: f32, scale: ParameterScale) -> Self {
        debug_assert!(max > min, "max must be greater than min");

        Self {
            min,
            max,
            default: default.clamp(min, max),
            scale,
        }
    }

    pub fn linear(min: f32, max: f32, default: f32) -> Self {
        Self::new(min, max, default, ParameterScale::Linear)
    }

    pub fn skewed(min: f32, max: f32, default: f32, skew: f32) -> Self {
        debug_assert!(skew > 0.0, "skew must be positive");
        Self::new(min, max, default, ParameterScale::Skewed { skew })
    }

    pub fn toggle(default_on: bool) -> Self {
        Self::new(
            0.0,
            1.0,
            if default_on { 1.0 } else { 0.0 },
            ParameterScale::Toggle,
        )
    }

    pub fn integer(min: i32, max: i32, default: i32) -> Self {
        Self::new(
            min as f32,
            max as f32,
            default as f32,
            ParameterScale::Integer,
        )
    }

    /// Real value to normalized 0.0-1.0. Out-of-range input is clamped.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }

        match self.scale {
            ParameterScale::Linear => (value - self.min) / span,
            ParameterScale::Skewed { skew } => {
                let proportion = (value - self.min) / span;
                if skew <= 0.0 || skew == 1.0 {
                    proportion
                } else {
                    proportion.powf(skew)
                }
            }
            ParameterScale::Toggle => {
                if value >= (self.min + self.max) / 2.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ParameterScale::Integer => (value.round() - self.min) / span,
        }
    }

    /// Normalized 0.0-1.0 to real value. Out-of-range input is clamped.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        let span = self.span();

        match self.scale {
            ParameterScale::Linear => self.min + normalized * span,
            ParameterScale::Skewed { skew } => {
                let proportion = if skew <= 0.0 || skew == 1.0 || normalized == 0.0 {
                    normalized
                } else {
                    normalized.powf(1.0 / skew)
                };
                self.min + proportion * span
            }
            ParameterScale::Toggle => {
                if normalized >= 0.5 {
                    self.max
                } else {
                    self.min
                }
            }
            ParameterScale::Integer => (self.min + normalized * span).round(),
        }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }

    #[inline]
    pub fn default_normalized(&self) -> f32 {
        self.normalize(self.default)
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

impl Default for ParameterRange {
    fn default() -> Self {
        Self::linear(0.0, 1.0, 0.5)
    }
}

/// Every parameter the sampler exposes to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Attack,
    Release,
    Cutoff,
    Resonance,
    Gain,
    BaseNote,
    MaxSlices,
    Sensitivity,
    MinGapMs,
    Choke,
    Gate,
}

impl ParamId {
    pub const ALL: [ParamId; 11] = [
        ParamId::Attack,
        ParamId::Release,
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::Gain,
        ParamId::BaseNote,
        ParamId::MaxSlices,
        ParamId::Sensitivity,
        ParamId::MinGapMs,
        ParamId::Choke,
        ParamId::Gate,
    ];

    /// Stable identifier used by hosts and saved sessions.
    pub fn key(self) -> &'static str {
        match self {
            ParamId::Attack => "attack",
            ParamId::Release => "release",
            ParamId::Cutoff => "cutoff",
            ParamId::Resonance => "reso",
            ParamId::Gain => "gain",
            ParamId::BaseNote => "basenote",
            ParamId::MaxSlices => "maxslices",
            ParamId::Sensitivity => "sensitivity",
            ParamId::MinGapMs => "mingapms",
            ParamId::Choke => "choke",
            ParamId::Gate => "gate",
        }
    }

    pub fn from_key(key: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.key() == key)
            .ok_or_else(|| crate::Error::UnknownParameter(key.to_string()))
    }
}

/// One host-visible parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub id: ParamId,
    pub name: &'static str,
    /// Unit label shown next to the value, empty when unitless.
    pub unit: &'static str,
    pub range: ParameterRange,
}

/// Ordered list of every host parameter with its range and default.
#[derive(Debug, Clone)]
pub struct ParameterLayout {
    params: Vec<ParameterDescriptor>,
}

impl ParameterLayout {
    pub fn new() -> Self {
        let describe = |id, name, unit, range| ParameterDescriptor {
            id,
            name,
            unit,
            range,
        };

        let params = vec![
            describe(
                ParamId::Attack,
                "Attack",
                "s",
                ParameterRange::skewed(0.001, 0.5, 0.01, 0.3),
            ),
            describe(
                ParamId::Release,
                "Release",
                "s",
                ParameterRange::skewed(0.005, 2.0, 0.2, 0.3),
            ),
            describe(
                ParamId::Cutoff,
                "Cutoff",
                "Hz",
                ParameterRange::skewed(40.0, 18000.0, 12000.0, 0.25),
            ),
            describe(
                ParamId::Resonance,
                "Resonance",
                "",
                ParameterRange::linear(0.1, 2.0, 0.7),
            ),
            describe(
                ParamId::Gain,
                "Gain",
                "dB",
                ParameterRange::linear(-24.0, 24.0, 0.0),
            ),
            describe(
                ParamId::BaseNote,
                "Base Note",
                "",
                ParameterRange::integer(0, 127, 36),
            ),
            describe(
                ParamId::MaxSlices,
                "Max Slices",
                "",
                ParameterRange::integer(1, 128, 64),
            ),
            describe(
                ParamId::Sensitivity,
                "Sensitivity",
                "",
                ParameterRange::linear(0.6, 2.0, 1.2),
            ),
            describe(
                ParamId::MinGapMs,
                "Min Gap",
                "ms",
                ParameterRange::linear(1.0, 500.0, 30.0),
            ),
            describe(ParamId::Choke, "Choke", "", ParameterRange::toggle(false)),
            describe(ParamId::Gate, "Gate", "", ParameterRange::toggle(false)),
        ];

        Self { params }
    }

    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    pub fn descriptor(&self, id: ParamId) -> &ParameterDescriptor {
        // Built from ParamId::ALL in the same order.
        &self.params[id as usize]
    }

    pub fn range(&self, id: ParamId) -> &ParameterRange {
        &self.descriptor(id).range
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for ParameterLayout {
    fn default() -> Self {
        Self::new()
    }
}
