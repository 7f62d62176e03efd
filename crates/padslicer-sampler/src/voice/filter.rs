//! Topology-preserving-transform state variable low-pass.
//!
//! `g = tan(pi * fc / sr)`, damping `k = 1 / resonance`. One pair of
//! integrator states per channel.

use std::f32::consts::PI;

use padslicer_core::AudioBuffer;

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    z1: f32,
    z2: f32,
}

#[derive(Debug, Clone)]
pub struct LowPassFilter {
    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
    a1: f32,
    a2: f32,
    a3: f32,
    states: Vec<ChannelState>,
}

impl LowPassFilter {
    pub fn new(sample_rate: f64, num_channels: usize) -> Self {
        let mut filter = Self {
            sample_rate: sample_rate as f32,
            cutoff: 12000.0,
            resonance: 0.7,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
            states: vec![ChannelState::default(); num_channels.max(1)],
        };
        filter.update_coefficients();
        filter
    }

    /// Resize channel state. Not RT-safe.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate as f32;
        self.states = vec![ChannelState::default(); num_channels.max(1)];
        self.update_coefficients();
    }

    pub fn set_params(&mut self, cutoff: f32, resonance: f32) {
        if cutoff == self.cutoff && resonance == self.resonance {
            return;
        }
        self.cutoff = cutoff;
        self.resonance = resonance;
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        // Stay below Nyquist so tan() stays finite.
        let nyquist_guard = self.sample_rate * 0.49;
        let cutoff = self.cutoff.clamp(10.0, nyquist_guard.max(10.0));
        let g = (PI * cutoff / self.sample_rate).tan();
        let k = 1.0 / self.resonance.max(0.01);
        self.a1 = 1.0 / (1.0 + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
    }

    pub fn reset(&mut self) {
        self.states.fill(ChannelState::default());
    }

    #[inline]
    fn tick(&self, state: &mut ChannelState, input: f32) -> f32 {
        let v3 = input - state.z2;
        let v1 = self.a1 * state.z1 + self.a2 * v3;
        let v2 = state.z2 + self.a2 * state.z1 + self.a3 * v3;
        state.z1 = 2.0 * v1 - state.z1;
        state.z2 = 2.0 * v2 - state.z2;
        v2
    }

    /// Filter the first `num_samples` frames of `buffer` in place. Channels
    /// beyond the prepared count pass through.
    pub fn process(&mut self, buffer: &mut AudioBuffer, num_samples: usize) {
        let num_samples = num_samples.min(buffer.num_frames());
        let mut states = std::mem::take(&mut self.states);
        for (state, ch) in states.iter_mut().zip(buffer.channels_mut()) {
            for sample in &mut ch[..num_samples] {
                *sample = self.tick(state, *sample);
            }
        }
        self.states = states;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sine(freq: f32, sr: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sr).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_dc_passes() {
        let mut filter = LowPassFilter::new(44100.0, 1);
        filter.set_params(1000.0, 0.7);
        let mut buffer = AudioBuffer::mono(vec![1.0; 4410]);
        filter.process(&mut buffer, 4410);
        assert_relative_eq!(buffer.sample(0, 4409), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_attenuates_above_cutoff() {
        let mut filter = LowPassFilter::new(44100.0, 2);
        filter.set_params(200.0, 0.7);

        let mut buffer = AudioBuffer::from_channels(vec![
            sine(8000.0, 44100.0, 8820),
            sine(50.0, 44100.0, 8820),
        ]);
        filter.process(&mut buffer, 8820);

        let high = rms(&buffer.channel(0)[4410..]);
        let low = rms(&buffer.channel(1)[4410..]);
        assert!(high < 0.01, "8 kHz leaked: {high}");
        assert!(low > 0.6, "50 Hz lost: {low}");
    }

    #[test]
    fn test_cutoff_above_nyquist_stays_finite() {
        let mut filter = LowPassFilter::new(8000.0, 1);
        filter.set_params(18000.0, 2.0);
        let mut buffer = AudioBuffer::mono(sine(1000.0, 8000.0, 800));
        filter.process(&mut buffer, 800);
        assert!(buffer.channel(0).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = LowPassFilter::new(44100.0, 1);
        let mut buffer = AudioBuffer::mono(vec![1.0; 64]);
        filter.process(&mut buffer, 64);
        filter.reset();

        let mut silent = AudioBuffer::mono(vec![0.0; 16]);
        filter.process(&mut silent, 16);
        assert!(silent.channel(0).iter().all(|&s| s == 0.0));
    }
}
