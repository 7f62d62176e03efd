//! The slicing sampler engine.
//!
//! One [`AudioEngine`] owns the loaded recording, its slices, the undo
//! history, the preview transport and the voice pool, all behind a single
//! data lock. Three threads touch it:
//!
//! - the render thread calls [`AudioEngine::render`], which only ever
//!   `try_lock`s and outputs silence when the lock is taken or a load is
//!   running
//! - the control thread edits slices and settings, locking unconditionally
//! - one loader thread at a time decodes and analyzes a file outside the
//!   lock, then installs it under the lock
//!
//! ```ignore
//! let engine = AudioEngine::builder().sample_rate(48000.0).build()?;
//! engine.load_file("break.wav")?;
//! engine.move_boundary(1, 12_000)?;
//! engine.undo();
//! ```

mod builder;
mod preview;
mod render;
mod state;

pub use builder::AudioEngineBuilder;
pub use state::{EngineState, STATE_VERSION};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use padslicer_analysis::SpectralFluxSlicer;
use padslicer_core::{AtomicFlag, AtomicFloat, AudioBuffer, PlaybackParams, SliceControls};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::decode::{DecodedAudio, Decoder};
use crate::history::History;
use crate::loader::{LoadInfo, LoadOutcome, Loader};
use crate::pool::SamplePool;
use crate::slices::{Slice, SliceSet, Snapshot};
use crate::time_stretch::StretchBackend;
use crate::voice::PadVoice;
use crate::{Error, Result};

use preview::Preview;

/// One undo step: the slice state and the controls it was cut with. The
/// minimum gap is not part of it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EditState {
    slices: Snapshot,
    controls: SliceControls,
}

/// Everything the data lock protects.
pub(crate) struct EngineData {
    pool: SamplePool,
    slices: SliceSet,
    history: History<EditState>,
    controls: SliceControls,
    /// Onset boundaries of the loaded recording for the current
    /// sensitivity and slice count. Rebuilds after taps or gap changes
    /// reuse them.
    onsets: Vec<usize>,
    min_gap: usize,
    sample_rate: f64,
    block_size: usize,
    voices: Vec<PadVoice>,
    preview: Preview,
    params: PlaybackParams,
    source_path: Option<PathBuf>,
    /// Slices restored from a saved state before their recording was
    /// loaded. Applied when `source_path` is loaded next.
    pending_restore: Option<Snapshot>,
}

impl EngineData {
    fn total(&self) -> usize {
        self.pool.len()
    }

    /// Rebuild the slice list from the cached onsets and the manual taps.
    fn build_slices(&mut self) {
        self.slices.rebuild(
            &self.onsets,
            self.pool.len(),
            self.controls.base_note,
            self.controls.max_slices,
            self.min_gap,
        );
        debug!(
            slices = self.slices.len(),
            min_gap = self.min_gap,
            "rebuilt slices"
        );
    }

    fn edit_state(&self) -> EditState {
        EditState {
            slices: self.slices.snapshot(),
            controls: self.controls,
        }
    }

    fn kill_voices(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    fn install(
        &mut self,
        decoded: DecodedAudio,
        path: Option<PathBuf>,
        onsets: Vec<usize>,
    ) -> LoadInfo {
        let pending = self
            .pending_restore
            .take()
            .filter(|_| path.is_some() && path == self.source_path);

        self.kill_voices();
        self.preview = Preview::default();
        self.pool.load(decoded);
        self.onsets = onsets;
        self.slices = SliceSet::new();
        self.history.clear();
        self.source_path = path;
        self.build_slices();

        if let Some(snapshot) = pending {
            let total = self.pool.len();
            match self.slices.restore(snapshot, Some(total)) {
                Ok(()) => debug!(slices = self.slices.len(), "applied saved slices"),
                Err(e) => warn!(error = %e, "saved slices do not fit the recording, re-sliced"),
            }
        }

        LoadInfo {
            name: self.pool.name().to_string(),
            channels: self.pool.buffer().num_channels(),
            frames: self.pool.len(),
            sample_rate: self.pool.sample_rate(),
            slices: self.slices.len(),
        }
    }
}

/// State shared with the loader thread.
pub(crate) struct Shared {
    data: Mutex<EngineData>,
    loading: AtomicFlag,
    /// Preview playhead as a fraction of the recording, published by render.
    preview_position: AtomicFloat,
    decoder: Box<dyn Decoder>,
    slicer: Mutex<SpectralFluxSlicer>,
}

impl Shared {
    fn analyze(&self, buffer: &AudioBuffer, controls: &SliceControls) -> Vec<usize> {
        let mut slicer = self.slicer.lock();
        slicer.set_threshold_scale(controls.sensitivity);
        slicer.slice(buffer, 0, controls.max_slices)
    }

    /// Decode, analyze and install. The loading flag must be held.
    fn load(&self, path: &Path) -> Result<LoadInfo> {
        info!(path = %path.display(), "loading sample");
        let decoded = self.decoder.decode(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to decode sample");
        })?;
        let info = self.install(decoded, Some(path.to_path_buf()));
        info!(
            path = %path.display(),
            channels = info.channels,
            frames = info.frames,
            sample_rate = info.sample_rate,
            slices = info.slices,
            "sample loaded"
        );
        Ok(info)
    }

    fn install(&self, decoded: DecodedAudio, path: Option<PathBuf>) -> LoadInfo {
        let controls = self.data.lock().controls;
        let mut onsets = self.analyze(&decoded.buffer, &controls);

        let mut data = self.data.lock();
        let current = data.controls;
        if current.sensitivity != controls.sensitivity || current.max_slices != controls.max_slices
        {
            onsets = self.analyze(&decoded.buffer, &current);
        }
        let info = data.install(decoded, path, onsets);
        self.preview_position.set(0.0);
        info
    }
}

/// Releases the loading flag when the load finishes, even by panic.
struct LoadingGuard(Arc<Shared>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.loading.release();
    }
}

/// Real-time slicing sampler.
///
/// All methods take `&self`; share the engine between the render and
/// control threads with an `Arc`.
pub struct AudioEngine {
    shared: Arc<Shared>,
    loader: Mutex<Loader>,
    backend: StretchBackend,
    channels: usize,
}

impl AudioEngine {
    pub fn builder() -> AudioEngineBuilder {
        AudioEngineBuilder::default()
    }

    fn claim_loading(&self) -> Result<LoadingGuard> {
        if !self.shared.loading.try_claim() {
            warn!("load rejected, another file is loading");
            return Err(Error::Busy);
        }
        Ok(LoadingGuard(Arc::clone(&self.shared)))
    }

    // Loading

    /// Decode and install `path` on the calling thread.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadInfo> {
        let _guard = self.claim_loading()?;
        self.stop_preview();
        self.shared.load(path.as_ref())
    }

    /// Install audio decoded elsewhere.
    pub fn load_decoded(&self, decoded: DecodedAudio) -> Result<LoadInfo> {
        let _guard = self.claim_loading()?;
        self.stop_preview();
        Ok(self.shared.install(decoded, None))
    }

    /// Start loading `path` on the loader thread.
    ///
    /// Fails with [`Error::Busy`] while another load is running. Collect the
    /// result with [`poll_load`](Self::poll_load) or
    /// [`wait_for_load`](Self::wait_for_load).
    pub fn load_file_async(&self, path: impl AsRef<Path>) -> Result<()> {
        let guard = self.claim_loading()?;
        self.stop_preview();

        let path = path.as_ref().to_path_buf();
        let shared = Arc::clone(&self.shared);
        self.loader.lock().spawn(path, move |path| {
            let _guard = guard;
            shared.load(path)
        })
    }

    /// Outcome of the last background load, once it is done.
    pub fn poll_load(&self) -> Option<LoadOutcome> {
        self.loader.lock().poll()
    }

    /// Block until the running background load finishes.
    pub fn wait_for_load(&self) -> Option<LoadOutcome> {
        self.loader.lock().wait()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.loading.get()
    }

    /// Join the loader thread. Dropping the engine does the same.
    pub fn shutdown(&self) {
        self.loader.lock().join();
    }

    // Configuration

    /// Re-prepare every voice for a new sample rate or block size and
    /// recompute the minimum gap. Not RT-safe.
    pub fn prepare(&self, sample_rate: f64, block_size: usize) -> Result<()> {
        padslicer_core::config::validate_sample_rate(sample_rate)?;
        if block_size == 0 {
            return Err(padslicer_core::Error::InvalidConfig(
                "block_size must be at least 1".into(),
            )
            .into());
        }

        let mut data = self.shared.data.lock();
        for voice in &mut data.voices {
            voice.prepare(sample_rate, block_size, self.channels);
        }
        data.sample_rate = sample_rate;
        data.block_size = block_size;

        let min_gap = data.controls.min_gap_samples(sample_rate);
        if min_gap != data.min_gap {
            data.min_gap = min_gap;
            if !data.pool.is_empty() {
                data.build_slices();
            }
        }
        debug!(sample_rate, block_size, "engine prepared");
        Ok(())
    }

    /// Apply base note, slice count and sensitivity. Out-of-range values are
    /// clamped. Returns `true` if anything changed (and an undo step was
    /// recorded).
    pub fn set_slice_controls(&self, base_note: i32, max_slices: i32, sensitivity: f32) -> bool {
        let mut data = self.shared.data.lock();
        let current = data.controls;
        let next = SliceControls::new(base_note, max_slices, sensitivity, current.min_gap_ms);

        let reanalyze = next.max_slices != current.max_slices
            || (next.sensitivity - current.sensitivity).abs() > 1e-4;
        if !reanalyze && next.base_note == current.base_note {
            return false;
        }

        let before = data.edit_state();
        data.history.push(before);
        data.controls = next;
        if !data.pool.is_empty() {
            if reanalyze {
                let onsets = self.shared.analyze(data.pool.buffer(), &next);
                data.onsets = onsets;
            }
            data.build_slices();
        }
        true
    }

    /// Minimum slice length in milliseconds, 1-500. Rebuilds when the gap in
    /// samples changes.
    pub fn set_min_gap_ms(&self, ms: f32) {
        let mut data = self.shared.data.lock();
        let controls = SliceControls {
            min_gap_ms: ms,
            ..data.controls
        }
        .clamped();
        data.controls = controls;

        let min_gap = controls.min_gap_samples(data.sample_rate);
        if min_gap != data.min_gap {
            data.min_gap = min_gap;
            if !data.pool.is_empty() {
                data.build_slices();
            }
        }
    }

    pub fn slice_controls(&self) -> SliceControls {
        self.shared.data.lock().controls
    }

    /// Minimum gap in samples at the prepared sample rate.
    pub fn min_gap_samples(&self) -> usize {
        self.shared.data.lock().min_gap
    }

    // Editing

    /// Move the start of slice `index` (and the end of its predecessor).
    /// Returns the clamped position actually used.
    pub fn move_boundary(&self, index: usize, new_pos: usize) -> Result<usize> {
        let mut data = self.shared.data.lock();
        let (total, min_gap) = (data.total(), data.min_gap);
        let before = data.edit_state();
        let pos = data.slices.move_boundary(index, new_pos, total, min_gap)?;
        data.history.push(before);
        debug!(index, pos, "moved slice boundary");
        Ok(pos)
    }

    /// Delete slice `index`, merging it into a neighbour.
    pub fn delete_slice(&self, index: usize) -> Result<()> {
        let mut data = self.shared.data.lock();
        let base_note = data.controls.base_note;
        let before = data.edit_state();
        data.slices.delete(index, base_note)?;
        data.history.push(before);
        debug!(index, remaining = data.slices.len(), "deleted slice");
        Ok(())
    }

    /// Add a manual boundary at the preview playhead and re-slice. Returns
    /// the tap position.
    ///
    /// Fails with [`Error::Unchanged`] when an existing tap within the
    /// minimum gap absorbs the new one.
    pub fn tap_slice_at_current(&self) -> Result<usize> {
        let mut data = self.shared.data.lock();
        let total = data.total();
        if total == 0 {
            return Err(Error::NoAudio);
        }
        let before = data.edit_state();
        let (position, min_gap) = (data.preview.position, data.min_gap);
        let tap = data.slices.insert_tap(position, total, min_gap)?;
        if data.slices.manual_taps() == before.slices.manual_taps.as_slice() {
            return Err(Error::Unchanged);
        }
        data.history.push(before);
        data.build_slices();
        debug!(tap, "inserted manual slice");
        Ok(tap)
    }

    /// Remove every manual tap and re-slice.
    pub fn clear_taps(&self) {
        let mut data = self.shared.data.lock();
        if data.slices.manual_taps().is_empty() {
            return;
        }
        let before = data.edit_state();
        data.history.push(before);
        data.slices.clear_taps();
        data.build_slices();
    }

    /// Install an undo or redo state, re-analyzing when it was cut with a
    /// different sensitivity or slice count. The current minimum gap stays.
    fn apply_edit_state(&self, data: &mut EngineData, state: EditState) {
        let controls = SliceControls {
            min_gap_ms: data.controls.min_gap_ms,
            ..state.controls
        };
        let reanalyze = controls.sensitivity != data.controls.sensitivity
            || controls.max_slices != data.controls.max_slices;

        data.slices.swap_snapshot(state.slices);
        data.controls = controls;
        if reanalyze && !data.pool.is_empty() {
            let onsets = self.shared.analyze(data.pool.buffer(), &controls);
            data.onsets = onsets;
        }
    }

    pub fn undo(&self) -> bool {
        let mut data = self.shared.data.lock();
        let current = data.edit_state();
        match data.history.undo(current) {
            Some(previous) => {
                self.apply_edit_state(&mut data, previous);
                debug!(slices = data.slices.len(), "undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&self) -> bool {
        let mut data = self.shared.data.lock();
        let current = data.edit_state();
        match data.history.redo(current) {
            Some(next) => {
                self.apply_edit_state(&mut data, next);
                debug!(slices = data.slices.len(), "redo");
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.shared.data.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.shared.data.lock().history.can_redo()
    }

    // Per-slice settings

    pub fn set_slice_gain_db(&self, index: usize, db: f32) -> Result<()> {
        self.shared.data.lock().slices.set_gain_db(index, db)
    }

    pub fn slice_gain_db(&self, index: usize) -> Option<f32> {
        self.shared.data.lock().slices.gain_db(index)
    }

    pub fn set_slice_pitch_semitones(&self, index: usize, semitones: f32) -> Result<()> {
        self.shared
            .data
            .lock()
            .slices
            .set_pitch_semitones(index, semitones)
    }

    pub fn slice_pitch_semitones(&self, index: usize) -> Option<f32> {
        self.shared.data.lock().slices.pitch_semitones(index)
    }

    pub fn set_slice_time_ratio(&self, index: usize, ratio: f32) -> Result<()> {
        self.shared.data.lock().slices.set_time_ratio(index, ratio)
    }

    pub fn slice_time_ratio(&self, index: usize) -> Option<f32> {
        self.shared.data.lock().slices.time_ratio(index)
    }

    pub fn set_slice_reverse(&self, index: usize, reverse: bool) -> Result<()> {
        self.shared.data.lock().slices.set_reverse(index, reverse)
    }

    pub fn slice_reverse(&self, index: usize) -> Option<bool> {
        self.shared.data.lock().slices.reverse(index)
    }

    // Read-only views

    pub fn slices(&self) -> Vec<Slice> {
        self.shared.data.lock().slices.slices().to_vec()
    }

    pub fn manual_taps(&self) -> Vec<usize> {
        self.shared.data.lock().slices.manual_taps().to_vec()
    }

    /// Waveform overview as `(min, max)` pairs.
    pub fn waveform(&self) -> Vec<(f32, f32)> {
        self.shared.data.lock().pool.waveform().to_pairs()
    }

    pub fn total_length_samples(&self) -> usize {
        self.shared.data.lock().total()
    }

    /// Sample rate of the loaded recording.
    pub fn sample_rate(&self) -> f64 {
        self.shared.data.lock().pool.sample_rate()
    }

    /// Rate the engine was prepared for.
    pub fn engine_sample_rate(&self) -> f64 {
        self.shared.data.lock().sample_rate
    }

    pub fn pool_name(&self) -> String {
        self.shared.data.lock().pool.name().to_string()
    }

    /// File the current recording came from, if it was loaded from disk.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.shared.data.lock().source_path.clone()
    }

    /// Run `f` against the sample pool under the data lock.
    pub fn with_pool<R>(&self, f: impl FnOnce(&SamplePool) -> R) -> R {
        f(&self.shared.data.lock().pool)
    }

    pub fn active_voices(&self) -> usize {
        self.shared
            .data
            .lock()
            .voices
            .iter()
            .filter(|v| v.is_active())
            .count()
    }

    /// Slices currently sounding, one entry per active voice.
    pub fn playing_slices(&self) -> Vec<Slice> {
        self.shared
            .data
            .lock()
            .voices
            .iter()
            .filter_map(|v| v.slice().copied())
            .collect()
    }

    pub fn stretch_backend(&self) -> StretchBackend {
        self.backend
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("backend", &self.backend)
            .field("channels", &self.channels)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
