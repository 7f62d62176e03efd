//! One polyphony slot: plays a single slice through envelope and filter.

use padslicer_core::{AudioBuffer, PlaybackParams};

use super::envelope::Envelope;
use super::filter::LowPassFilter;
use crate::slices::Slice;
use crate::time_stretch::{StretchBackend, TimeStretcher};

/// A voice playing one slice of the loaded recording.
///
/// Forward playback goes through the stretcher; reverse playback copies
/// samples backwards at the original rate. The voice goes idle when the
/// playhead reaches the slice boundary or the envelope finishes.
pub struct PadVoice {
    slice: Option<Slice>,
    position: usize,
    active: bool,
    envelope: Envelope,
    filter: LowPassFilter,
    stretcher: Box<dyn TimeStretcher>,
    scratch: AudioBuffer,
}

impl std::fmt::Debug for PadVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadVoice")
            .field("slice", &self.slice)
            .field("position", &self.position)
            .field("active", &self.active)
            .field("envelope", &self.envelope.stage())
            .finish()
    }
}

impl PadVoice {
    pub fn new(
        backend: StretchBackend,
        sample_rate: f64,
        max_block: usize,
        num_channels: usize,
    ) -> Self {
        let max_block = max_block.max(1);
        let num_channels = num_channels.max(1);
        Self {
            slice: None,
            position: 0,
            active: false,
            envelope: Envelope::new(sample_rate),
            filter: LowPassFilter::new(sample_rate, num_channels),
            stretcher: backend.create(sample_rate, max_block),
            scratch: AudioBuffer::new(num_channels, max_block),
        }
    }

    /// Size scratch and DSP state. Not RT-safe.
    pub fn prepare(&mut self, sample_rate: f64, max_block: usize, num_channels: usize) {
        let max_block = max_block.max(1);
        let num_channels = num_channels.max(1);
        self.envelope.set_sample_rate(sample_rate);
        self.filter.prepare(sample_rate, num_channels);
        self.stretcher.prepare(sample_rate, max_block);
        self.scratch = AudioBuffer::new(num_channels, max_block);
        self.kill();
    }

    /// Largest block `render` accepts.
    pub fn max_block(&self) -> usize {
        self.scratch.num_frames()
    }

    /// Push envelope and filter settings. Called once per render cycle.
    #[inline]
    pub fn set_params(&mut self, params: &PlaybackParams) {
        self.envelope.set_times(params.attack, params.release);
        self.filter.set_params(params.cutoff, params.resonance);
    }

    pub fn start_note(&mut self, slice: Slice) {
        self.position = if slice.reverse { slice.end } else { slice.start };
        self.stretcher
            .configure(slice.time_ratio, slice.pitch_semitones);
        self.stretcher.reset();
        self.filter.reset();
        self.envelope.note_on();
        self.slice = Some(slice);
        self.active = true;
    }

    /// Enter release.
    pub fn stop_note(&mut self) {
        if self.active {
            self.envelope.note_off();
        }
    }

    /// Silence immediately.
    pub fn kill(&mut self) {
        self.active = false;
        self.envelope.reset();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_playing_note(&self, note: u8) -> bool {
        self.active && self.slice.is_some_and(|s| s.trigger_note == note)
    }

    pub fn slice(&self) -> Option<&Slice> {
        self.slice.as_ref().filter(|_| self.active)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Mix `num_samples` frames into `output` starting at `offset`.
    ///
    /// `num_samples` is capped at [`max_block`](Self::max_block); the engine
    /// chunks larger blocks.
    pub fn render(
        &mut self,
        source: &AudioBuffer,
        output: &mut AudioBuffer,
        offset: usize,
        num_samples: usize,
        master_gain: f32,
    ) {
        let Some(slice) = self.slice.filter(|_| self.active) else {
            return;
        };
        let n = num_samples.min(self.scratch.num_frames());
        if n == 0 {
            return;
        }
        let end = slice.end.min(source.num_frames());
        let start = slice.start.min(end);
        if source.num_channels() == 0 || end <= start {
            self.kill();
            return;
        }

        let remaining = if slice.reverse {
            self.position.saturating_sub(start)
        } else {
            end.saturating_sub(self.position)
        };
        let k = n.min(remaining);

        if slice.reverse {
            for (c, dest) in self.scratch.channels_mut().enumerate() {
                let src = source.channel_clamped(c);
                for (j, d) in dest[..k].iter_mut().enumerate() {
                    let idx = (self.position as isize - 1 - j as isize)
                        .clamp(start as isize, end as isize - 1) as usize;
                    *d = src[idx];
                }
            }
            self.position -= k;
        } else if k > 0 {
            let consumed = self
                .stretcher
                .process(source, self.position, k, &mut self.scratch);
            self.position = (self.position + consumed).min(end);
        }
        self.scratch.clear_range(k, n - k);

        self.envelope.apply(&mut self.scratch, n);
        self.filter.process(&mut self.scratch, n);
        output.add_from(offset, &self.scratch, 0, n, master_gain * slice.gain);

        let at_boundary = if slice.reverse {
            self.position <= start
        } else {
            self.position >= end
        };
        if at_boundary || !self.envelope.is_active() {
            self.kill();
        }
    }
}
