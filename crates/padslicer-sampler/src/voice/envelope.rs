//! Attack / sustain / release envelope.
//!
//! Linear attack to full level, hold at 1.0 while the note is down, linear
//! release from wherever the level is when the note is let go. A stage with
//! zero length completes on the spot.

use padslicer_core::AudioBuffer;

/// Envelope stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle,
    Attack,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,
    attack_secs: f32,
    release_secs: f32,
    stage: EnvelopeStage,
    level: f32,
    attack_step: f32,
    release_step: f32,
}

impl Envelope {
    pub fn new(sample_rate: f64) -> Self {
        let mut env = Self {
            sample_rate: sample_rate as f32,
            attack_secs: 0.01,
            release_secs: 0.2,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            attack_step: 0.0,
            release_step: 0.0,
        };
        env.update_steps();
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate as f32;
        self.update_steps();
    }

    /// Times in seconds. Negative values count as zero.
    pub fn set_times(&mut self, attack_secs: f32, release_secs: f32) {
        if attack_secs == self.attack_secs && release_secs == self.release_secs {
            return;
        }
        self.attack_secs = attack_secs.max(0.0);
        self.release_secs = release_secs.max(0.0);
        self.update_steps();
    }

    fn update_steps(&mut self) {
        self.attack_step = step_for(self.attack_secs, self.sample_rate, 1.0);
        if self.stage == EnvelopeStage::Release {
            self.release_step = step_for(self.release_secs, self.sample_rate, self.level);
        }
    }

    pub fn note_on(&mut self) {
        self.level = 0.0;
        if self.attack_step > 0.0 {
            self.stage = EnvelopeStage::Attack;
        } else {
            self.level = 1.0;
            self.stage = EnvelopeStage::Sustain;
        }
    }

    pub fn note_off(&mut self) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        self.release_step = step_for(self.release_secs, self.sample_rate, self.level);
        if self.release_step > 0.0 {
            self.stage = EnvelopeStage::Release;
        } else {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Idle;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => 0.0,
            EnvelopeStage::Attack => {
                let out = self.level;
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Sustain;
                }
                out
            }
            EnvelopeStage::Sustain => 1.0,
            EnvelopeStage::Release => {
                let out = self.level;
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.reset();
                }
                out
            }
        }
    }

    /// Multiply the first `num_samples` frames of every channel by the
    /// envelope.
    pub fn apply(&mut self, buffer: &mut AudioBuffer, num_samples: usize) {
        let num_samples = num_samples.min(buffer.num_frames());
        for i in 0..num_samples {
            let gain = self.next_sample();
            for ch in buffer.channels_mut() {
                ch[i] *= gain;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

/// Per-sample increment covering `distance` over `secs`, 0 for an instant stage.
#[inline]
fn step_for(secs: f32, sample_rate: f32, distance: f32) -> f32 {
    let samples = secs * sample_rate;
    if samples > 0.0 {
        distance / samples
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_attack_then_sustain() {
        let mut env = Envelope::new(1000.0);
        env.set_times(0.004, 0.1);
        env.note_on();

        let levels: Vec<f32> = (0..6).map(|_| env.next_sample()).collect();
        assert_eq!(levels, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.0]);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn test_release_from_current_level() {
        let mut env = Envelope::new(1000.0);
        env.set_times(0.004, 0.002);
        env.note_on();
        env.next_sample();
        env.next_sample(); // level now 0.5

        env.note_off();
        assert_relative_eq!(env.next_sample(), 0.5);
        assert_relative_eq!(env.next_sample(), 0.25);
        env.next_sample();
        assert!(!env.is_active());
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn test_zero_length_stages_are_instant() {
        let mut env = Envelope::new(44100.0);
        env.set_times(0.0, 0.0);
        env.note_on();
        assert_eq!(env.next_sample(), 1.0);

        env.note_off();
        assert!(!env.is_active());
    }

    #[test]
    fn test_apply_scales_all_channels() {
        let mut env = Envelope::new(1000.0);
        env.set_times(0.002, 0.1);
        env.note_on();

        let mut buffer = AudioBuffer::from_channels(vec![vec![1.0; 3], vec![2.0; 3]]);
        env.apply(&mut buffer, 3);

        assert_eq!(buffer.channel(0), &[0.0, 0.5, 1.0]);
        assert_eq!(buffer.channel(1), &[0.0, 1.0, 2.0]);
    }
}
