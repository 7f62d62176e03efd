//! Audio file decoding.
//!
//! The engine only needs a [`Decoder`]: something that turns a path into a
//! float buffer plus sample rate. [`WavDecoder`] (feature `wav`) covers WAV
//! through `hound`; other formats plug in through the same trait.

use std::path::Path;

use padslicer_core::AudioBuffer;

use crate::Result;

/// A fully decoded recording.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub buffer: AudioBuffer,
    pub sample_rate: f64,
    /// Display name, usually the file stem.
    pub name: String,
}

impl DecodedAudio {
    pub fn new(buffer: AudioBuffer, sample_rate: f64, name: impl Into<String>) -> Self {
        Self {
            buffer,
            sample_rate,
            name: name.into(),
        }
    }
}

/// Turns a file into samples. Called on the loader thread.
pub trait Decoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// File stem as a display name, empty if the path has none.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(feature = "wav")]
pub use wav::WavDecoder;

#[cfg(feature = "wav")]
mod wav {
    use super::*;
    use crate::Error;
    use hound::{SampleFormat, WavReader};

    /// WAV decoder for 8/16/24/32-bit integer and 32-bit float files.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WavDecoder;

    impl Decoder for WavDecoder {
        fn decode(&self, path: &Path) -> Result<DecodedAudio> {
            let is_wav = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
                .unwrap_or(false);
            if !is_wav {
                return Err(Error::UnsupportedFormat(path.display().to_string()));
            }

            let reader = WavReader::open(path)?;
            let spec = reader.spec();
            let channels = spec.channels as usize;
            if channels == 0 {
                return Err(Error::Decode(format!("{}: no channels", path.display())));
            }

            let samples: Vec<f32> = match spec.sample_format {
                SampleFormat::Float => reader
                    .into_samples::<f32>()
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                SampleFormat::Int => {
                    let bits = spec.bits_per_sample;
                    if bits == 0 || bits > 32 {
                        return Err(Error::Decode(format!(
                            "{}: unsupported bit depth {bits}",
                            path.display()
                        )));
                    }
                    let max_val = (1i64 << (bits - 1)) as f32;
                    reader
                        .into_samples::<i32>()
                        .map(|s| s.map(|s| s as f32 / max_val))
                        .collect::<std::result::Result<Vec<_>, _>>()?
                }
            };

            Ok(DecodedAudio {
                buffer: AudioBuffer::from_interleaved(&samples, channels),
                sample_rate: spec.sample_rate as f64,
                name: display_name(path),
            })
        }
    }

}
