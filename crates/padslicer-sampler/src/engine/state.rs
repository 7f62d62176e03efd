//! Editable state as an opaque blob for host session save/restore.

use std::collections::BTreeMap;
use std::path::PathBuf;

use padslicer_core::SliceControls;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AudioEngine;
use crate::slices::{Slice, SliceId, Snapshot};
use crate::{Error, Result};

pub const STATE_VERSION: u32 = 1;

/// Everything the user edited, minus the audio itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub version: u32,
    pub slice_controls: SliceControls,
    pub slices: Vec<Slice>,
    pub gain_overrides: BTreeMap<SliceId, f32>,
    pub manual_taps: Vec<usize>,
    /// Recording the slices refer to, for the host to reload.
    pub source_path: Option<PathBuf>,
}

impl EngineState {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: Self = bincode::deserialize(bytes)?;
        if state.version != STATE_VERSION {
            return Err(Error::InvalidState(format!(
                "unsupported state version {}",
                state.version
            )));
        }
        Ok(state)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slices: self.slices.clone(),
            gain_overrides: self.gain_overrides.clone(),
            manual_taps: self.manual_taps.clone(),
        }
    }
}

impl AudioEngine {
    /// Capture the current editable state.
    pub fn state(&self) -> EngineState {
        let data = self.shared.data.lock();
        let snapshot = data.slices.snapshot();
        EngineState {
            version: STATE_VERSION,
            slice_controls: data.controls,
            slices: snapshot.slices,
            gain_overrides: snapshot.gain_overrides,
            manual_taps: snapshot.manual_taps,
            source_path: data.source_path.clone(),
        }
    }

    pub fn get_state(&self) -> Result<Vec<u8>> {
        self.state().to_bytes()
    }

    /// Restore a blob from [`get_state`](Self::get_state). Invalid blobs are
    /// rejected with nothing changed; on success the undo history is
    /// cleared.
    pub fn set_state(&self, bytes: &[u8]) -> Result<()> {
        let state = EngineState::from_bytes(bytes)?;
        self.restore_state(state)
    }

    pub fn restore_state(&self, state: EngineState) -> Result<()> {
        let controls = state.slice_controls.clamped();
        let snapshot = state.snapshot();

        let mut data = self.shared.data.lock();
        let total = (!data.pool.is_empty()).then(|| data.pool.len());
        let pending = total.is_none().then(|| snapshot.clone());
        data.slices.restore(snapshot, total)?;
        data.pending_restore = pending;

        let reanalyze = controls.sensitivity != data.controls.sensitivity
            || controls.max_slices != data.controls.max_slices;
        data.controls = controls;
        data.min_gap = controls.min_gap_samples(data.sample_rate);
        if reanalyze && !data.pool.is_empty() {
            let onsets = self.shared.analyze(data.pool.buffer(), &controls);
            data.onsets = onsets;
        }
        data.history.clear();
        data.kill_voices();
        if state.source_path.is_some() {
            data.source_path = state.source_path;
        }
        debug!(slices = data.slices.len(), "restored state");
        Ok(())
    }
}
