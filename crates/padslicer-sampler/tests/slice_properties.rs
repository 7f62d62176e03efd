//! Property tests for slice list editing.

use padslicer_sampler::{History, SliceSet};
use proptest::prelude::*;

const BASE: u8 = 36;

fn assert_contiguous(set: &SliceSet, total: usize) {
    let slices = set.slices();
    assert_eq!(slices[0].start, 0);
    assert_eq!(slices.last().map(|s| s.end), Some(total));
    for pair in slices.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert!(pair[0].start < pair[1].start);
    }
    for (k, slice) in slices.iter().enumerate() {
        assert_eq!(slice.trigger_note as usize, BASE as usize + k);
    }
}

fn layout() -> impl Strategy<Value = (usize, Vec<usize>, usize, usize)> {
    (1_000usize..200_000).prop_flat_map(|total| {
        (
            Just(total),
            prop::collection::vec(0..total, 0..40),
            1usize..2_000,
            1usize..64,
        )
    })
}

fn built(total: usize, boundaries: &[usize], min_gap: usize, max: usize) -> SliceSet {
    let mut set = SliceSet::new();
    set.rebuild(boundaries, total, BASE, max, min_gap);
    set
}

proptest! {
    #[test]
    fn rebuild_respects_gap_and_limit((total, mut boundaries, min_gap, max) in layout()) {
        boundaries.sort_unstable();
        let set = built(total, &boundaries, min_gap, max);

        prop_assert!(!set.is_empty());
        prop_assert!(set.len() <= max);
        assert_contiguous(&set, total);
        for pair in set.slices().windows(2) {
            prop_assert!(pair[1].start - pair[0].start >= min_gap);
        }
    }

    #[test]
    fn rebuild_is_deterministic((total, boundaries, min_gap, max) in layout()) {
        let mut sorted = boundaries.clone();
        sorted.sort_unstable();
        let a = built(total, &sorted, min_gap, max);
        let b = built(total, &sorted, min_gap, max);
        prop_assert_eq!(a.slices(), b.slices());
    }

    #[test]
    fn move_boundary_stays_between_neighbours(
        (total, mut boundaries, min_gap, max) in layout(),
        pick in any::<prop::sample::Index>(),
        target in any::<usize>(),
    ) {
        boundaries.sort_unstable();
        let mut set = built(total, &boundaries, min_gap, max);
        prop_assume!(set.len() >= 2);
        let index = 1 + pick.index(set.len() - 1);
        let before = set.slices().to_vec();

        match set.move_boundary(index, target, total, min_gap) {
            Ok(pos) => {
                prop_assert!(pos > before[index - 1].start);
                prop_assert!(pos < before[index].end);
                prop_assert_eq!(set.slices()[index].start, pos);
            }
            Err(_) => {
                prop_assert_eq!(set.slices(), before.as_slice());
            }
        }
        assert_contiguous(&set, total);
        prop_assert_eq!(set.len(), before.len());
    }

    #[test]
    fn delete_drops_one_and_relabels(
        (total, mut boundaries, min_gap, max) in layout(),
        pick in any::<prop::sample::Index>(),
    ) {
        boundaries.sort_unstable();
        let mut set = built(total, &boundaries, min_gap, max);
        let before = set.len();

        if before == 1 {
            prop_assert!(set.delete(0, BASE).is_err());
            prop_assert_eq!(set.len(), 1);
        } else {
            set.delete(pick.index(before), BASE).unwrap();
            prop_assert_eq!(set.len(), before - 1);
        }
        assert_contiguous(&set, total);
    }

    #[test]
    fn undo_then_redo_is_exact(
        (total, mut boundaries, min_gap, max) in layout(),
        edits in prop::collection::vec((0u8..3, any::<prop::sample::Index>(), any::<usize>()), 1..12),
    ) {
        boundaries.sort_unstable();
        let mut set = built(total, &boundaries, min_gap, max);
        let mut history = History::new(64);
        let mut states = vec![set.snapshot()];

        for (kind, pick, value) in edits {
            let before = set.snapshot();
            let index = pick.index(set.len());
            let applied = match kind {
                0 if index > 0 => set.move_boundary(index, value % total, total, min_gap).is_ok(),
                1 => set.delete(index, BASE).is_ok(),
                2 => set.set_gain_db(index, -((value % 48) as f32)).is_ok(),
                _ => false,
            };
            if applied {
                history.push(before);
                states.push(set.snapshot());
            }
        }

        for expected in states.iter().rev().skip(1) {
            let restored = history.undo(set.snapshot()).unwrap();
            set.swap_snapshot(restored);
            prop_assert_eq!(&set.snapshot(), expected);
        }
        prop_assert!(!history.can_undo());

        for expected in states.iter().skip(1) {
            let restored = history.redo(set.snapshot()).unwrap();
            set.swap_snapshot(restored);
            prop_assert_eq!(&set.snapshot(), expected);
        }
        prop_assert!(!history.can_redo());
    }
}
