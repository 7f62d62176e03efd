//! Audio-thread entry point.
//!
//! Never blocks (`try_lock` only), never allocates and has no error path.
//! Host blocks longer than the prepared block size are split into chunks;
//! each note event is handled at the start of the chunk that contains its
//! frame offset.

use padslicer_core::{AudioBuffer, MidiEvent, NoteAction, PlaybackParams};

use super::{AudioEngine, EngineData};

impl AudioEngine {
    /// Render one block into `output`.
    ///
    /// `output` is cleared first. While a file is loading, or while the
    /// control thread holds the data lock, the block stays silent and the
    /// events are dropped.
    pub fn render(&self, output: &mut AudioBuffer, events: &[MidiEvent], params: &PlaybackParams) {
        output.clear();
        if self.shared.loading.get() {
            return;
        }
        let Some(mut data) = self.shared.data.try_lock() else {
            return;
        };
        let was_previewing = data.preview.playing;
        data.render(output, events, params);
        if was_previewing || data.preview.playing {
            self.shared.preview_position.set(data.preview_norm());
        }
    }
}

impl EngineData {
    fn render(&mut self, output: &mut AudioBuffer, events: &[MidiEvent], params: &PlaybackParams) {
        self.params = params.clamped();
        for voice in &mut self.voices {
            voice.set_params(&self.params);
        }
        let master_gain = self.params.master_gain();

        let total_frames = output.num_frames();
        let chunk_size = self
            .voices
            .first()
            .map_or(self.block_size, |v| v.max_block())
            .min(self.block_size)
            .max(1);

        if total_frames == 0 {
            for event in events {
                self.handle_event(event);
            }
            return;
        }

        let mut offset = 0;
        while offset < total_frames {
            let len = chunk_size.min(total_frames - offset);
            let chunk_end = offset + len;
            for event in events {
                let frame = event.frame_offset.min(total_frames - 1);
                if frame >= offset && frame < chunk_end {
                    self.handle_event(event);
                }
            }

            self.render_preview(output, offset, len);
            for voice in &mut self.voices {
                voice.render(self.pool.buffer(), output, offset, len, master_gain);
            }
            offset = chunk_end;
        }
    }

    fn handle_event(&mut self, event: &MidiEvent) {
        match event.action() {
            Some(NoteAction::On { note, .. }) => self.note_on(note),
            Some(NoteAction::Off { note }) => {
                if self.params.gate {
                    for voice in &mut self.voices {
                        if voice.is_playing_note(note) {
                            voice.stop_note();
                        }
                    }
                }
            }
            None => {}
        }
    }

    fn note_on(&mut self, note: u8) {
        let Some(slice) = self
            .slices
            .for_note(note, self.controls.base_note)
            .copied()
        else {
            return;
        };

        if self.params.choke {
            self.kill_voices();
        }
        if let Some(voice) = self.voices.iter_mut().find(|v| !v.is_active()) {
            voice.start_note(slice);
        }
    }
}
