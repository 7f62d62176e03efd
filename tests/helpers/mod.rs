//! Test helpers and fixtures for padslicer integration tests.
//!
//! Signal generators, level measurements and a WAV writer for fixture
//! files. Generators are deterministic so slice layouts are reproducible.

#![allow(dead_code)]

use std::path::Path;

use padslicer::prelude::*;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f64 = 44100.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// Values below this are considered silent (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Generate a sine wave at `frequency` for `num_samples`.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Reproducible white noise in -1..1.
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        })
        .collect()
}

/// Drum-like loop: exponentially decaying noise bursts at `hits` over a
/// quiet sine bed.
pub fn generate_drum_loop(num_samples: usize, sample_rate: f64, hits: &[usize]) -> Vec<f32> {
    let mut samples: Vec<f32> = generate_sine(110.0, sample_rate, num_samples)
        .into_iter()
        .map(|s| s * 0.02)
        .collect();
    let decay = (-1.0 / (0.03 * sample_rate)).exp() as f32;
    for (n, &hit) in hits.iter().enumerate() {
        let burst = generate_noise(4096, n as u64 + 1);
        let mut env = 0.9f32;
        for (i, s) in burst.into_iter().enumerate() {
            let Some(dest) = samples.get_mut(hit + i) else {
                break;
            };
            *dest += s * env;
            env *= decay;
        }
    }
    samples
}

/// Evenly spaced hit positions.
pub fn hit_positions(num_samples: usize, spacing: usize) -> Vec<usize> {
    (spacing..num_samples).step_by(spacing).collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Assert that a signal is approximately silent.
pub fn assert_silence(samples: &[f32]) {
    let max = peak(samples);
    assert!(
        max <= SILENCE_THRESHOLD,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content.
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Write channel-major samples to a 32-bit float WAV file.
pub fn write_wav(path: &Path, channels: &[Vec<f32>], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create WAV file");
    let frames = channels.first().map_or(0, |c| c.len());
    for i in 0..frames {
        for channel in channels {
            writer
                .write_sample(channel[i])
                .expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV file");
}

/// Engine at the test sample rate with default settings.
pub fn test_engine() -> AudioEngine {
    AudioEngine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .block_size(TEST_BUFFER_SIZE)
        .build()
        .expect("Failed to create test engine")
}

/// Render `blocks` blocks with no events and return the left channel.
pub fn render_blocks(engine: &AudioEngine, params: &PlaybackParams, blocks: usize) -> Vec<f32> {
    let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);
    let mut left = Vec::with_capacity(blocks * TEST_BUFFER_SIZE);
    for _ in 0..blocks {
        engine.render(&mut out, &[], params);
        left.extend_from_slice(out.channel(0));
    }
    left
}

/// Install a tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
