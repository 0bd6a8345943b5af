// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Integration tests for the text formats: phone sets, mappings, segment
//! lists and the JSON shape of the serde-derived types.

use std::fs;

use sadkit::error::SadError;
use sadkit::mappings::Mappings;
use sadkit::phones::PhoneSet;
use sadkit::sad::segment::{load_segments, save_segments, SpeechSegment};
use sadkit::sad::SadParams;

#[test]
fn test_phone_set_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phones.txt");
    fs::write(&path, "SIL\nAA\nAE\nOW\n").unwrap();

    let phones = PhoneSet::from_path(&path).unwrap();
    assert_eq!(phones.len(), 4);
    assert_eq!(phones.silence(), 0);
    assert_eq!(phones.name(0), Some("SIL"));
    assert_eq!(phones.index("OW"), Some(3));
}

#[test]
fn test_phone_set_file_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phones.txt");
    fs::write(&path, "SIL\nAA\nAA\n").unwrap();
    assert!(matches!(
        PhoneSet::from_path(&path),
        Err(SadError::InvalidInput(_))
    ));
}

#[test]
fn test_mappings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.map");
    fs::write(&path, "AE AE0\nOW OW1\n").unwrap();

    let mappings = Mappings::from_path(&path).unwrap();
    assert_eq!(mappings.lookup("AE"), "AE0");
    assert_eq!(mappings.lookup("OW"), "OW1");
    assert_eq!(mappings.lookup("XX"), "XX");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.map");
    assert!(matches!(Mappings::from_path(&path), Err(SadError::Io(_))));
}

#[test]
fn test_segment_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utterance.seg");

    let segments = vec![SpeechSegment::new(12, 88), SpeechSegment::new(120, 451)];
    save_segments(&path, &segments).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "12 88\n120 451\n");

    let loaded = load_segments(&path).unwrap();
    assert_eq!(loaded, segments);
}

#[test]
fn test_sad_params_json_round_trip() {
    let params = SadParams {
        max_components_silence: 4,
        max_components_speech: 16,
        silence_to_speech_penalty: -45.5,
        frames_padding: 12,
        states_per_class: 3,
    };

    let json = serde_json::to_string(&params).unwrap();
    let parsed: SadParams = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.max_components_silence, 4);
    assert_eq!(parsed.max_components_speech, 16);
    assert_eq!(parsed.silence_to_speech_penalty, -45.5);
    assert_eq!(parsed.frames_padding, 12);
    assert_eq!(parsed.states_per_class, 3);
}

#[test]
fn test_segments_json_round_trip() {
    let segments = vec![SpeechSegment::new(12, 88), SpeechSegment::new(120, 451)];
    let json = serde_json::to_string(&segments).unwrap();
    assert_eq!(json, r#"[{"start":12,"end":88},{"start":120,"end":451}]"#);

    let parsed: Vec<SpeechSegment> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, segments);
}

#[test]
fn test_segment_file_rejects_inverted_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.seg");
    fs::write(&path, "10 20\n30 25\n").unwrap();
    assert!(matches!(
        load_segments(&path),
        Err(SadError::InvalidInput(_))
    ));
}
