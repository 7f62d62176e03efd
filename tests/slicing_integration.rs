//! Slicing and editing through the public engine API.

mod helpers;

use helpers::*;
use padslicer::prelude::*;
use padslicer::sampler::Error as SamplerError;

const TEN_SECONDS: usize = 441_000;
const MIN_GAP: usize = 1323;

fn loop_engine(max_slices: usize) -> (AudioEngine, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drums.wav");
    let hits = hit_positions(TEN_SECONDS, 22_050);
    write_wav(
        &path,
        &[generate_drum_loop(TEN_SECONDS, TEST_SAMPLE_RATE, &hits)],
        44100,
    );

    let engine = AudioEngine::builder()
        .slice_controls(SliceControls {
            max_slices,
            ..SliceControls::default()
        })
        .build()
        .unwrap();
    engine.load_file(&path).unwrap();
    (engine, dir)
}

fn assert_well_formed(slices: &[Slice], total: usize, min_gap: usize) {
    assert_eq!(slices[0].start, 0);
    assert_eq!(slices.last().unwrap().end, total);
    for pair in slices.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
        assert!(
            pair[1].start - pair[0].start >= min_gap,
            "slices at {} and {} closer than {min_gap}",
            pair[0].start,
            pair[1].start
        );
    }
}

#[test]
fn test_ten_second_loop_with_eight_slices() {
    init_tracing();
    let (engine, _dir) = loop_engine(8);

    assert_eq!(engine.min_gap_samples(), MIN_GAP);
    assert_eq!(engine.total_length_samples(), TEN_SECONDS);
    assert_eq!(engine.pool_name(), "drums");

    let slices = engine.slices();
    assert!(!slices.is_empty() && slices.len() <= 8);
    assert_well_formed(&slices, TEN_SECONDS, MIN_GAP);
    for (i, slice) in slices.iter().enumerate() {
        assert_eq!(slice.trigger_note as usize, 36 + i);
    }
}

#[test]
fn test_slicing_is_deterministic() {
    let (first, _a) = loop_engine(64);
    let (second, _b) = loop_engine(64);

    let starts = |e: &AudioEngine| e.slices().iter().map(|s| s.start).collect::<Vec<_>>();
    assert_eq!(starts(&first), starts(&second));
    assert!(first.slices().len() > 1);
}

#[test]
fn test_move_boundary_stays_in_window() {
    let (engine, _dir) = loop_engine(8);
    let slices = engine.slices();
    assert!(slices.len() >= 3, "need at least three slices");

    let pos = engine.move_boundary(1, 0).unwrap();
    assert_eq!(pos, MIN_GAP);

    let pos = engine.move_boundary(1, usize::MAX).unwrap();
    assert_eq!(pos, slices[2].start - MIN_GAP);

    assert!(matches!(
        engine.move_boundary(1, pos),
        Err(SamplerError::Unchanged)
    ));
    assert!(matches!(
        engine.move_boundary(0, 10),
        Err(SamplerError::InvalidIndex { .. })
    ));
    assert_well_formed(&engine.slices(), TEN_SECONDS, MIN_GAP);
}

#[test]
fn test_delete_relabels_and_shrinks() {
    let (engine, _dir) = loop_engine(8);
    let before = engine.slices();

    engine.delete_slice(1).unwrap();

    let after = engine.slices();
    assert_eq!(after.len(), before.len() - 1);
    assert_eq!(after[0].end, before[2].start);
    for (i, slice) in after.iter().enumerate() {
        assert_eq!(slice.trigger_note as usize, 36 + i);
    }

    while engine.slices().len() > 1 {
        engine.delete_slice(0).unwrap();
    }
    assert!(matches!(
        engine.delete_slice(0),
        Err(SamplerError::LastSlice)
    ));
    assert_eq!(engine.slices()[0].start, 0);
    assert_eq!(engine.slices()[0].end, TEN_SECONDS);
}

#[test]
fn test_undo_redo_restores_exact_state() {
    let (engine, _dir) = loop_engine(8);
    let initial = engine.slices();
    assert!(!engine.undo());

    engine.set_slice_gain_db(2, -9.0).unwrap();
    engine.move_boundary(2, initial[2].start + 5000).unwrap();
    let after_move = engine.slices();
    engine.delete_slice(1).unwrap();
    let after_delete = engine.slices();
    engine.set_preview_position_norm(0.9);
    engine.tap_slice_at_current().unwrap();
    let after_tap = engine.slices();

    assert!(engine.undo());
    assert_eq!(engine.slices(), after_delete);
    assert!(engine.undo());
    assert_eq!(engine.slices(), after_move);
    assert!(engine.undo());
    assert_eq!(engine.slices()[2].start, initial[2].start);
    assert!(!engine.undo());
    assert!(engine.can_redo());

    assert!(engine.redo());
    assert_eq!(engine.slices(), after_move);
    assert!(engine.redo());
    assert!(engine.redo());
    assert_eq!(engine.slices(), after_tap);
    assert!(!engine.redo());
}

#[test]
fn test_gain_override_follows_slice() {
    let (engine, _dir) = loop_engine(8);
    engine.set_slice_gain_db(3, -6.0).unwrap();
    let id = engine.slices()[3].id;

    engine.delete_slice(1).unwrap();

    let slices = engine.slices();
    assert_eq!(slices[2].id, id);
    assert!((engine.slice_gain_db(2).unwrap() + 6.0).abs() < 1e-4);
    assert_eq!(engine.slice_gain_db(3), Some(0.0));
}

#[test]
fn test_state_round_trip() {
    let (engine, dir) = loop_engine(8);
    engine.set_slice_controls(48, 8, 1.2);
    engine.set_slice_reverse(0, true).unwrap();
    engine.set_slice_time_ratio(1, 2.0).unwrap();
    engine.move_boundary(1, 30_000).unwrap();
    let saved = engine.get_state().unwrap();
    let expected = engine.slices();

    let restored = AudioEngine::builder().build().unwrap();
    restored.load_file(dir.path().join("drums.wav")).unwrap();
    restored.set_state(&saved).unwrap();

    assert_eq!(restored.slices(), expected);
    assert_eq!(restored.slice_controls().base_note, 48);
    assert_eq!(restored.slice_reverse(0), Some(true));
    assert!(!restored.can_undo());
    assert_eq!(
        restored.state().source_path,
        Some(dir.path().join("drums.wav"))
    );
}

#[test]
fn test_restored_session_survives_reload() {
    let (engine, dir) = loop_engine(8);
    let path = dir.path().join("drums.wav");
    let moved = (engine.slices()[2].start + engine.slices()[3].start) / 2;
    engine.move_boundary(2, moved).unwrap();
    engine.set_slice_gain_db(1, -6.0).unwrap();
    let saved = engine.get_state().unwrap();
    let expected = engine.slices();

    // A host restoring a session sets the state before the file is back.
    let restored = AudioEngine::builder()
        .slice_controls(SliceControls {
            max_slices: 8,
            ..SliceControls::default()
        })
        .build()
        .unwrap();
    restored.set_state(&saved).unwrap();
    restored.load_file(&path).unwrap();

    assert_eq!(restored.slices(), expected);
    assert_eq!(restored.slices()[2].start, moved);
    assert!((restored.slice_gain_db(1).unwrap() + 6.0).abs() < 1e-4);
    assert!(!restored.can_undo());
}
