//! Bounded undo/redo history of edit states (slice snapshots by default).
//!
//! `entries[..cursor]` are undo states (oldest first), `entries[cursor..]`
//! are redo states (nearest first). Undo and redo swap the current state
//! with the entry at the cursor, so a single edit can be undone and redone
//! exactly.

use std::collections::VecDeque;

use crate::slices::Snapshot;

pub const DEFAULT_HISTORY_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct History<T = Snapshot> {
    entries: VecDeque<T>,
    cursor: usize,
    depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            entries: VecDeque::with_capacity(depth + 1),
            cursor: 0,
            depth,
        }
    }

    /// Record the state from before an edit. Drops the redo tail and, past
    /// the depth limit, the oldest entry.
    pub fn push(&mut self, before: T) {
        self.entries.truncate(self.cursor);
        self.entries.push_back(before);
        self.cursor += 1;
        if self.entries.len() > self.depth {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }

    /// Step back. Returns the state to install, or `None` at the oldest entry.
    pub fn undo(&mut self, current: T) -> Option<T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(std::mem::replace(&mut self.entries[self.cursor], current))
    }

    /// Step forward. Returns the state to install, or `None` at the newest.
    pub fn redo(&mut self, current: T) -> Option<T> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let next = std::mem::replace(&mut self.entries[self.cursor], current);
        self.cursor += 1;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tap: usize) -> Snapshot {
        Snapshot {
            manual_taps: vec![tap],
            ..Default::default()
        }
    }

    #[test]
    fn test_single_edit_undo_redo() {
        let mut history: History = History::default();
        assert!(!history.can_undo());

        history.push(snap(0));
        let current = snap(1);

        let restored = history.undo(current).unwrap();
        assert_eq!(restored, snap(0));
        assert!(history.can_redo());
        assert!(!history.can_undo());

        let redone = history.redo(restored).unwrap();
        assert_eq!(redone, snap(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_walks_every_state() {
        let mut history: History = History::default();
        // states 0 -> 1 -> 2 -> 3
        for i in 0..3 {
            history.push(snap(i));
        }
        let mut current = snap(3);
        for expected in (0..3).rev() {
            current = history.undo(current).unwrap();
            assert_eq!(current, snap(expected));
        }
        assert!(history.undo(current.clone()).is_none());

        for expected in 1..4 {
            current = history.redo(current).unwrap();
            assert_eq!(current, snap(expected));
        }
        assert!(history.redo(current).is_none());
    }

    #[test]
    fn test_push_drops_redo_tail() {
        let mut history: History = History::default();
        history.push(snap(0));
        history.push(snap(1));
        let current = history.undo(snap(2)).unwrap();

        history.push(current);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_depth_evicts_oldest() {
        let mut history: History = History::new(3);
        for i in 0..5 {
            history.push(snap(i));
        }
        assert_eq!(history.len(), 3);

        let mut current = snap(5);
        let mut seen = Vec::new();
        while let Some(prev) = history.undo(current.clone()) {
            seen.push(prev.manual_taps[0]);
            current = prev;
        }
        assert_eq!(seen, vec![4, 3, 2]);
    }
}
