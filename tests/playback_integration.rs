//! Rendering slices, preview and stretch backends through the engine.

mod helpers;

use helpers::*;
use padslicer::prelude::*;
use padslicer::{DecodedAudio, GrainSize};

const LEVEL: f32 = 0.25;

/// Four one-second slices of a constant level, cut with manual taps.
fn tapped_engine(backend: StretchBackend) -> AudioEngine {
    let engine = AudioEngine::builder()
        .stretch_backend(backend)
        .build()
        .unwrap();
    engine
        .load_decoded(DecodedAudio::new(
            AudioBuffer::mono(vec![LEVEL; 4 * 44100]),
            44100.0,
            "steady",
        ))
        .unwrap();
    for norm in [0.25, 0.5, 0.75] {
        engine.set_preview_position_norm(norm);
        engine.tap_slice_at_current().unwrap();
    }
    engine
}

fn on(note: u8) -> MidiEvent {
    MidiEvent::note_on(0, 0, note, 127)
}

fn fast_params() -> PlaybackParams {
    PlaybackParams {
        attack: 0.001,
        cutoff: 18000.0,
        ..PlaybackParams::default()
    }
}

#[test]
fn test_note_plays_its_slice() {
    let engine = tapped_engine(StretchBackend::Linear);
    let starts: Vec<usize> = engine.slices().iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0, 44100, 88200, 132300]);
    let params = fast_params();

    let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);
    engine.render(&mut out, &[on(36)], &params);
    let tail = render_blocks(&engine, &params, 4);

    assert_eq!(engine.playing_slices()[0].trigger_note, 36);
    assert_has_audio(&tail, 0.05);
    assert_eq!(out.channel(0), out.channel(1));
}

#[test]
fn test_choke_keeps_only_latest_slice() {
    let engine = tapped_engine(StretchBackend::Linear);
    let choke = PlaybackParams {
        choke: true,
        ..fast_params()
    };
    let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);

    engine.render(&mut out, &[on(37)], &choke);
    engine.render(&mut out, &[on(39)], &choke);

    let playing = engine.playing_slices();
    assert_eq!(playing.len(), 1);
    assert_eq!(playing[0].trigger_note, 39);
    assert_eq!(engine.active_voices(), 1);
}

#[test]
fn test_slice_gain_scales_output() {
    let params = fast_params();
    let level = |db: f32| {
        let engine = tapped_engine(StretchBackend::Linear);
        engine.set_slice_gain_db(1, db).unwrap();
        let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);
        engine.render(&mut out, &[on(37)], &params);
        rms(&render_blocks(&engine, &params, 8))
    };

    let unity = level(0.0);
    let half = level(-6.0206);
    assert!((half / unity - 0.5).abs() < 0.01, "{half} vs {unity}");
    assert!(level(-120.0) < SILENCE_THRESHOLD);
}

#[test]
fn test_voice_ends_at_slice_boundary() {
    let engine = tapped_engine(StretchBackend::Linear);
    let params = fast_params();
    let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);

    engine.render(&mut out, &[on(39)], &params);
    // Last slice is one second long.
    render_blocks(&engine, &params, 44100 / TEST_BUFFER_SIZE + 2);

    assert_eq!(engine.active_voices(), 0);
}

#[test]
fn test_reverse_slice_plays_backwards_to_start() {
    let engine = tapped_engine(StretchBackend::Linear);
    engine.set_slice_reverse(0, true).unwrap();
    let params = fast_params();
    let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);

    engine.render(&mut out, &[on(36)], &params);
    assert!(peak(out.channel(0)) > 0.05);

    let blocks = 44100 / TEST_BUFFER_SIZE + 2;
    render_blocks(&engine, &params, blocks);
    assert_eq!(engine.active_voices(), 0);
}

#[test]
fn test_time_ratio_lengthens_playback() {
    for backend in [
        StretchBackend::Linear,
        StretchBackend::Granular(GrainSize::Medium),
    ] {
        let engine = tapped_engine(backend);
        engine.set_slice_time_ratio(3, 2.0).unwrap();
        let params = fast_params();
        let mut out = AudioBuffer::new(2, TEST_BUFFER_SIZE);

        engine.render(&mut out, &[on(39)], &params);
        // Past the unstretched length, still sounding.
        render_blocks(&engine, &params, 44100 / TEST_BUFFER_SIZE + 10);
        assert_eq!(engine.active_voices(), 1, "{backend:?}");

        render_blocks(&engine, &params, 44100 / TEST_BUFFER_SIZE + 10);
        assert_eq!(engine.active_voices(), 0, "{backend:?}");
    }
}

#[test]
fn test_preview_plays_whole_recording_at_half_gain() {
    let engine = tapped_engine(StretchBackend::Linear);
    engine.set_preview_position_norm(0.1);
    engine.start_preview();

    let out = render_blocks(&engine, &PlaybackParams::default(), 1);

    assert!(out.iter().all(|&s| (s - LEVEL * 0.5).abs() < 1e-6));
    assert!(engine.preview_position_norm() > 0.1);
}

#[test]
fn test_preview_loop_wraps() {
    let engine = tapped_engine(StretchBackend::Linear);
    engine.set_loop_preview(true);
    engine.set_loop_region_norm(0.5, 0.51);
    engine.set_preview_position_norm(0.5);
    engine.start_preview();

    render_blocks(&engine, &PlaybackParams::default(), 20);

    assert!(engine.is_previewing());
    let pos = engine.preview_position_norm();
    assert!((0.5..=0.52).contains(&pos), "{pos}");

    engine.set_loop_preview(false);
    engine.set_preview_position_norm(0.999);
    render_blocks(&engine, &PlaybackParams::default(), 2);
    assert!(!engine.is_previewing());
}
