//! Whole-recording preview transport.
//!
//! Plays the loaded recording straight through (or around a loop region)
//! at a fixed 0.5 gain, independent of the pad voices. Its playhead is where
//! manual taps land.

use padslicer_core::AudioBuffer;

use super::{AudioEngine, EngineData};

const PREVIEW_GAIN: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Preview {
    pub(crate) playing: bool,
    pub(crate) looping: bool,
    pub(crate) position: usize,
    /// Loop region in samples; `loop_end == 0` means "to the end".
    pub(crate) loop_start: usize,
    pub(crate) loop_end: usize,
}

impl Preview {
    /// Effective loop region for a recording of `total` samples.
    pub(crate) fn loop_bounds(&self, total: usize) -> (usize, usize) {
        let start = self.loop_start.min(total);
        let end = if self.loop_end > 0 {
            self.loop_end
        } else {
            total
        };
        (start, end.clamp(start, total))
    }
}

impl EngineData {
    /// Mix the next `len` preview frames into `output` at `offset`.
    pub(crate) fn render_preview(&mut self, output: &mut AudioBuffer, offset: usize, len: usize) {
        if !self.preview.playing {
            return;
        }
        let total = self.pool.len();
        if total == 0 {
            self.preview.playing = false;
            return;
        }

        let position = self.preview.position.min(total);
        let n = len.min(total - position);
        output.add_from(offset, self.pool.buffer(), position, n, PREVIEW_GAIN);
        self.preview.position = position + n;

        let (loop_start, loop_end) = self.preview.loop_bounds(total);
        let boundary = if self.preview.looping { loop_end } else { total };
        if self.preview.position >= boundary {
            if self.preview.looping {
                self.preview.position = loop_start;
            } else {
                self.preview.playing = false;
                self.preview.position = total;
            }
        }
    }

    /// Returns false without audio. A playhead at the end rewinds.
    fn start_preview(&mut self) -> bool {
        let total = self.pool.len();
        if total == 0 {
            return false;
        }
        if self.preview.position >= total {
            self.preview.position = 0;
        }
        self.preview.playing = true;
        true
    }

    pub(crate) fn preview_norm(&self) -> f32 {
        match self.pool.len() {
            0 => 0.0,
            total => self.preview.position.min(total) as f32 / total as f32,
        }
    }
}

impl AudioEngine {
    fn publish_preview(&self, data: &EngineData) {
        self.shared.preview_position.set(data.preview_norm());
    }

    /// Start the preview. Does nothing without audio; a playhead at the end
    /// rewinds to the start.
    pub fn start_preview(&self) {
        let mut data = self.shared.data.lock();
        if data.start_preview() {
            self.publish_preview(&data);
        }
    }

    pub fn stop_preview(&self) {
        self.shared.data.lock().preview.playing = false;
    }

    /// Stop a running preview or start a stopped one, under one lock.
    pub fn toggle_preview(&self) {
        let mut data = self.shared.data.lock();
        if data.preview.playing {
            data.preview.playing = false;
        } else if data.start_preview() {
            self.publish_preview(&data);
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.shared.data.lock().preview.playing
    }

    pub fn set_loop_preview(&self, looping: bool) {
        self.shared.data.lock().preview.looping = looping;
    }

    pub fn is_loop_preview(&self) -> bool {
        self.shared.data.lock().preview.looping
    }

    /// Jump the preview playhead to a fraction of the recording.
    pub fn set_preview_position_norm(&self, norm: f32) {
        let mut data = self.shared.data.lock();
        let total = data.pool.len();
        let norm = if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) };
        data.preview.position = if total == 0 {
            0
        } else {
            ((norm as f64 * total as f64).round() as usize).min(total - 1)
        };
        self.publish_preview(&data);
    }

    /// Preview playhead as a fraction of the recording, 0 when empty. Does
    /// not take the data lock.
    pub fn preview_position_norm(&self) -> f32 {
        self.shared.preview_position.get()
    }

    /// Set the loop region from two fractions of the recording. Reversed
    /// bounds are swapped.
    pub fn set_loop_region_norm(&self, start: f32, end: f32) {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let (mut a, mut b) = (clamp(start), clamp(end));
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }

        let mut data = self.shared.data.lock();
        let total = data.pool.len();
        if total == 0 {
            data.preview.loop_start = 0;
            data.preview.loop_end = 0;
            return;
        }
        data.preview.loop_start = (a as f64 * total as f64).round() as usize;
        data.preview.loop_end = (b as f64 * total as f64).round() as usize;
    }

    /// Loop region as fractions, `(0, 1)` when unset or nothing is loaded.
    pub fn loop_region_norm(&self) -> (f32, f32) {
        let data = self.shared.data.lock();
        let total = data.pool.len();
        if total == 0 || data.preview.loop_end == 0 {
            return (0.0, 1.0);
        }
        let (start, end) = data.preview.loop_bounds(total);
        (start as f32 / total as f32, end as f32 / total as f32)
    }
}
