//! Slice list, per-slice gain overrides and manual taps.
//!
//! Slices are contiguous: `slices[i].end == slices[i + 1].start`, the first
//! one starts at 0 and the last one ends at the recording length. Every
//! slice gets a [`SliceId`] when it is created; gain overrides are keyed by
//! that id, so they follow the slice through boundary moves and deletions
//! instead of sticking to a list position.

use std::collections::BTreeMap;

use padslicer_core::{db_to_gain, gain_to_db};
use serde::{Deserialize, Serialize};

use crate::time_stretch::{clamp_pitch, clamp_time_ratio};
use crate::{Error, Result};

/// Identity of a slice, stable across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SliceId(pub u64);

/// One playable region of the recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub id: SliceId,
    pub start: usize,
    /// Exclusive.
    pub end: usize,
    pub trigger_note: u8,
    /// Linear gain.
    pub gain: f32,
    /// -24 to +24.
    pub pitch_semitones: f32,
    /// 0.25 to 4.0.
    pub time_ratio: f32,
    pub reverse: bool,
}

impl Slice {
    pub fn new(id: SliceId, start: usize, end: usize, trigger_note: u8) -> Self {
        Self {
            id,
            start,
            end,
            trigger_note,
            gain: 1.0,
            pitch_semitones: 0.0,
            time_ratio: 1.0,
            reverse: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Full copy of the editable slice state, kept by the undo history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub slices: Vec<Slice>,
    pub gain_overrides: BTreeMap<SliceId, f32>,
    pub manual_taps: Vec<usize>,
}

/// The current slices plus the side tables rebuilt alongside them.
#[derive(Debug, Clone, Default)]
pub struct SliceSet {
    slices: Vec<Slice>,
    gain_overrides: BTreeMap<SliceId, f32>,
    manual_taps: Vec<usize>,
    next_id: u64,
}

impl SliceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slice> {
        self.slices.get(index)
    }

    pub fn gain_overrides(&self) -> &BTreeMap<SliceId, f32> {
        &self.gain_overrides
    }

    pub fn manual_taps(&self) -> &[usize] {
        &self.manual_taps
    }

    /// Slice triggered by `note`, if it maps to a playable one.
    #[inline]
    pub fn for_note(&self, note: u8, base_note: u8) -> Option<&Slice> {
        let index = note.checked_sub(base_note)? as usize;
        self.slices.get(index).filter(|s| !s.is_empty())
    }

    fn fresh_id(&mut self) -> SliceId {
        let id = SliceId(self.next_id);
        self.next_id += 1;
        id
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.slices.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.slices.len(),
            });
        }
        Ok(())
    }

    /// Replace the slice list from onset boundaries and manual taps.
    ///
    /// Starts are `{0} ∪ boundaries ∪ taps`, sorted, thinned so consecutive
    /// starts are at least `min_gap` apart (the earlier one wins) and cut to
    /// `max_slices`. A new slice starting where a current slice starts takes
    /// over its id and gain override; every other slice gets a fresh id and
    /// unity gain. `total == 0` clears the list.
    pub fn rebuild(
        &mut self,
        boundaries: &[usize],
        total: usize,
        base_note: u8,
        max_slices: usize,
        min_gap: usize,
    ) {
        if total == 0 {
            self.slices.clear();
            self.gain_overrides.clear();
            return;
        }

        let mut starts = Vec::with_capacity(boundaries.len() + self.manual_taps.len() + 1);
        starts.push(0);
        starts.extend(boundaries.iter().copied().filter(|&b| b < total));
        starts.extend(self.manual_taps.iter().map(|&t| t.min(total - 1)));
        starts.sort_unstable();

        let starts = thin_by_gap(&starts, min_gap.max(1));
        let count = starts.len().min(max_slices.max(1));

        let previous: BTreeMap<usize, SliceId> =
            self.slices.iter().map(|s| (s.start, s.id)).collect();

        let mut slices = Vec::with_capacity(count);
        for k in 0..count {
            let start = starts[k];
            let end = if k + 1 < count { starts[k + 1] } else { total };
            let id = match previous.get(&start) {
                Some(&id) => id,
                None => self.fresh_id(),
            };
            let mut slice = Slice::new(id, start, end, note_for(base_note, k));
            if let Some(&gain) = self.gain_overrides.get(&id) {
                slice.gain = gain;
            }
            slices.push(slice);
        }

        self.gain_overrides
            .retain(|id, _| slices.iter().any(|s| s.id == *id));
        self.slices = slices;
    }

    /// Where `move_boundary` would put the start of slice `index`.
    ///
    /// The position is clamped to `[0, total]`, then to stay `min_gap` away
    /// from the neighbouring starts (or from the end for the last slice).
    pub fn boundary_target(
        &self,
        index: usize,
        new_pos: usize,
        total: usize,
        min_gap: usize,
    ) -> Result<usize> {
        if index == 0 || index >= self.slices.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.slices.len(),
            });
        }

        let prev = &self.slices[index - 1];
        let current = &self.slices[index];
        let lo = prev.start + min_gap;
        let hi = match self.slices.get(index + 1) {
            Some(next) => next.start.saturating_sub(min_gap),
            None => min_gap.max(total.saturating_sub(min_gap)),
        };

        let pos = new_pos.min(total);
        let pos = if pos < lo {
            lo
        } else if pos > hi {
            hi
        } else {
            pos
        };

        // Both neighbours keep at least one sample even when the gap window
        // is narrower than the two slices.
        Ok(pos.clamp(prev.start + 1, current.end - 1))
    }

    /// Move the boundary between slices `index - 1` and `index`.
    ///
    /// Fails with [`Error::Unchanged`] when the clamped position equals the
    /// current start, leaving everything untouched.
    pub fn move_boundary(
        &mut self,
        index: usize,
        new_pos: usize,
        total: usize,
        min_gap: usize,
    ) -> Result<usize> {
        let target = self.boundary_target(index, new_pos, total, min_gap)?;
        if target == self.slices[index].start {
            return Err(Error::Unchanged);
        }

        self.slices[index - 1].end = target;
        let slice = &mut self.slices[index];
        slice.start = target;
        if let Some(&gain) = self.gain_overrides.get(&slice.id) {
            slice.gain = gain;
        }
        Ok(target)
    }

    /// Remove slice `index`, merging its range into a neighbour.
    ///
    /// Deleting slice 0 stretches slice 1 back to sample 0; slice 1 keeps
    /// its id and gain override.
    pub fn delete(&mut self, index: usize, base_note: u8) -> Result<()> {
        self.check_index(index)?;
        if self.slices.len() == 1 {
            return Err(Error::LastSlice);
        }

        let removed = if index > 0 {
            self.slices[index - 1].end = self.slices[index].end;
            self.slices.remove(index)
        } else {
            self.slices[1].start = 0;
            self.slices.remove(0)
        };
        self.gain_overrides.remove(&removed.id);

        self.relabel(base_note);
        Ok(())
    }

    /// Add a manual boundary at `pos` (clamped into the recording) and thin
    /// the tap list by `min_gap`. The caller rebuilds afterwards.
    pub fn insert_tap(&mut self, pos: usize, total: usize, min_gap: usize) -> Result<usize> {
        if total == 0 {
            return Err(Error::NoAudio);
        }
        let pos = pos.min(total - 1);
        self.manual_taps.push(pos);
        self.manual_taps.sort_unstable();
        self.manual_taps = thin_by_gap(&self.manual_taps, min_gap.max(1));
        Ok(pos)
    }

    pub fn clear_taps(&mut self) {
        self.manual_taps.clear();
    }

    /// `trigger_note = base_note + index` for every slice.
    pub fn relabel(&mut self, base_note: u8) {
        for (k, slice) in self.slices.iter_mut().enumerate() {
            slice.trigger_note = note_for(base_note, k);
        }
    }

    pub fn set_gain_db(&mut self, index: usize, db: f32) -> Result<()> {
        self.check_index(index)?;
        let gain = if db.is_nan() { 1.0 } else { db_to_gain(db) };
        let slice = &mut self.slices[index];
        slice.gain = gain;
        self.gain_overrides.insert(slice.id, gain);
        Ok(())
    }

    pub fn gain_db(&self, index: usize) -> Option<f32> {
        self.slices.get(index).map(|s| gain_to_db(s.gain))
    }

    pub fn set_pitch_semitones(&mut self, index: usize, semitones: f32) -> Result<()> {
        self.check_index(index)?;
        self.slices[index].pitch_semitones = clamp_pitch(semitones);
        Ok(())
    }

    pub fn pitch_semitones(&self, index: usize) -> Option<f32> {
        self.slices.get(index).map(|s| s.pitch_semitones)
    }

    pub fn set_time_ratio(&mut self, index: usize, ratio: f32) -> Result<()> {
        self.check_index(index)?;
        self.slices[index].time_ratio = clamp_time_ratio(ratio);
        Ok(())
    }

    pub fn time_ratio(&self, index: usize) -> Option<f32> {
        self.slices.get(index).map(|s| s.time_ratio)
    }

    pub fn set_reverse(&mut self, index: usize, reverse: bool) -> Result<()> {
        self.check_index(index)?;
        self.slices[index].reverse = reverse;
        Ok(())
    }

    pub fn reverse(&self, index: usize) -> Option<bool> {
        self.slices.get(index).map(|s| s.reverse)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            slices: self.slices.clone(),
            gain_overrides: self.gain_overrides.clone(),
            manual_taps: self.manual_taps.clone(),
        }
    }

    /// Swap the current state with `snapshot`, returning the state replaced.
    pub fn swap_snapshot(&mut self, snapshot: Snapshot) -> Snapshot {
        let replaced = Snapshot {
            slices: std::mem::replace(&mut self.slices, snapshot.slices),
            gain_overrides: std::mem::replace(&mut self.gain_overrides, snapshot.gain_overrides),
            manual_taps: std::mem::replace(&mut self.manual_taps, snapshot.manual_taps),
        };
        self.bump_next_id();
        replaced
    }

    /// Install a snapshot loaded from outside after checking it describes a
    /// well-formed slice list over `total` samples (`None` skips the length
    /// check).
    pub fn restore(&mut self, snapshot: Snapshot, total: Option<usize>) -> Result<()> {
        validate(&snapshot, total)?;
        self.swap_snapshot(snapshot);
        Ok(())
    }

    fn bump_next_id(&mut self) {
        let max = self.slices.iter().map(|s| s.id.0 + 1).max().unwrap_or(0);
        self.next_id = self.next_id.max(max);
    }
}

/// Keep the first value, then every value at least `gap` past the last kept.
fn thin_by_gap(sorted: &[usize], gap: usize) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(sorted.len());
    for &value in sorted {
        match kept.last() {
            Some(&last) if value < last + gap => {}
            _ => kept.push(value),
        }
    }
    kept
}

#[inline]
fn note_for(base_note: u8, index: usize) -> u8 {
    base_note.saturating_add(index.min(u8::MAX as usize) as u8)
}

fn validate(snapshot: &Snapshot, total: Option<usize>) -> Result<()> {
    let slices = &snapshot.slices;
    let invalid = |msg: String| Err(Error::InvalidState(msg));

    if let Some(first) = slices.first() {
        if first.start != 0 {
            return invalid(format!("first slice starts at {}", first.start));
        }
    }
    for (i, slice) in slices.iter().enumerate() {
        if slice.end <= slice.start {
            return invalid(format!("slice {i} has no length"));
        }
        if let Some(next) = slices.get(i + 1) {
            if next.start != slice.end {
                return invalid(format!("slices {i} and {} are not contiguous", i + 1));
            }
        }
        if !(0.25..=4.0).contains(&slice.time_ratio) || !(-24.0..=24.0).contains(&slice.pitch_semitones)
        {
            return invalid(format!("slice {i} has out-of-range stretch settings"));
        }
    }
    if let (Some(total), Some(last)) = (total, slices.last()) {
        if last.end > total {
            return invalid(format!("slices end at {} past length {total}", last.end));
        }
    }

    let mut ids: Vec<SliceId> = slices.iter().map(|s| s.id).collect();
    ids.sort_unstable();
    if ids.windows(2).any(|w| w[0] == w[1]) {
        return invalid("duplicate slice ids".into());
    }
    if let Some(id) = snapshot
        .gain_overrides
        .keys()
        .find(|id| ids.binary_search(id).is_err())
    {
        return invalid(format!("gain override for unknown slice {}", id.0));
    }
    if snapshot.manual_taps.windows(2).any(|w| w[0] > w[1]) {
        return invalid("manual taps are not sorted".into());
    }
    Ok(())
}
