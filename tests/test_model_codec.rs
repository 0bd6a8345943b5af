// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Integration tests for the binary model codec.

use sadkit::acoustic::codec::{read_state, write_state, AcousticModel};
use sadkit::acoustic::gaussian::{Covariance, Gaussian};
use sadkit::acoustic::state::HmmState;
use sadkit::error::SadError;
use sadkit::phones::PhoneSet;

fn phones() -> PhoneSet {
    PhoneSet::new(vec!["SIL".to_string(), "AA".to_string(), "OW".to_string()]).unwrap()
}

/// A D=2 state with two components, as in the round-trip scenario.
fn sample_state() -> HmmState {
    HmmState::new(
        1,
        2,
        7,
        42,
        2,
        vec![
            Gaussian::new(-1, 0.75, vec![1.5, -2.25], vec![0.5, 2.0]),
            Gaussian::new(-1, 0.25, vec![-0.125, 3.0], vec![1.25, 0.0625]),
        ],
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Per-state payload
// ---------------------------------------------------------------------------

#[test]
fn test_state_round_trip_field_equality() {
    let phones = phones();
    let state = sample_state();

    let mut bytes = Vec::new();
    write_state(&mut bytes, &state, &phones).unwrap();

    // Symbol field (9) + state (1) + position (1) + count (4)
    // + 2 components x (weight (4) + mean (8) + covariance (8)).
    assert_eq!(bytes.len(), 9 + 1 + 1 + 4 + 2 * (4 + 8 + 8));

    let loaded = read_state(&mut bytes.as_slice(), 2, 42, &phones).unwrap();
    assert_eq!(loaded.phone(), state.phone());
    assert_eq!(loaded.state_index(), state.state_index());
    assert_eq!(loaded.position(), state.position());
    assert_eq!(loaded.id(), 42);
    assert_eq!(loaded.components().len(), 2);
    for (original, read) in state.components().iter().zip(loaded.components()) {
        assert_eq!(original.weight.to_bits(), read.weight.to_bits());
        assert_eq!(original.mean, read.mean);
        assert_eq!(original.covariance.values(), read.covariance.values());
        assert!(!read.covariance.is_precomputed());
    }
}

#[test]
fn test_state_round_trip_byte_identical() {
    let phones = phones();
    let state = sample_state();

    let mut first = Vec::new();
    write_state(&mut first, &state, &phones).unwrap();
    let loaded = read_state(&mut first.as_slice(), 2, 42, &phones).unwrap();
    let mut second = Vec::new();
    write_state(&mut second, &loaded, &phones).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_writer_inverts_precomputed_covariance() {
    let phones = phones();
    let mut state = sample_state();
    let original: Vec<Vec<f32>> = state
        .components()
        .iter()
        .map(|g| g.covariance.values().to_vec())
        .collect();
    state.initialize().unwrap();

    let mut bytes = Vec::new();
    write_state(&mut bytes, &state, &phones).unwrap();
    let loaded = read_state(&mut bytes.as_slice(), 2, 42, &phones).unwrap();

    for (variances, component) in original.iter().zip(loaded.components()) {
        assert!(matches!(component.covariance, Covariance::Original(_)));
        for (expected, actual) in variances.iter().zip(component.covariance.values()) {
            assert!((expected - actual).abs() <= expected.abs() * 1e-6);
        }
    }
}

#[test]
fn test_read_rejects_unknown_phone() {
    let phones = phones();
    let state = sample_state();
    let mut bytes = Vec::new();
    write_state(&mut bytes, &state, &phones).unwrap();

    let reduced = PhoneSet::new(vec!["SIL".to_string()]).unwrap();
    assert!(matches!(
        read_state(&mut bytes.as_slice(), 2, 0, &reduced),
        Err(SadError::InvalidInput(_))
    ));
}

#[test]
fn test_read_rejects_bad_state_index() {
    let phones = phones();
    let state = sample_state();
    let mut bytes = Vec::new();
    write_state(&mut bytes, &state, &phones).unwrap();

    // Corrupt the state index field (right after the 9-byte symbol).
    bytes[9] = 200;
    assert!(matches!(
        read_state(&mut bytes.as_slice(), 2, 0, &phones),
        Err(SadError::InvalidInput(_))
    ));
}

#[test]
fn test_read_rejects_truncated_stream() {
    let phones = phones();
    let state = sample_state();
    let mut bytes = Vec::new();
    write_state(&mut bytes, &state, &phones).unwrap();

    bytes.truncate(bytes.len() - 3);
    assert!(matches!(
        read_state(&mut bytes.as_slice(), 2, 0, &phones),
        Err(SadError::Io(_))
    ));
}

// ---------------------------------------------------------------------------
// Model-set files
// ---------------------------------------------------------------------------

#[test]
fn test_model_file_round_trip() {
    let phones = phones();
    let states = vec![
        HmmState::new(
            0,
            0,
            0,
            0,
            2,
            vec![Gaussian::new(-1, 1.0, vec![0.0, 0.0], vec![1.0, 1.0])],
        )
        .unwrap(),
        sample_state(),
    ];
    let model = AcousticModel::new(2, states).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acoustic.sadm");
    model.save(&path, &phones).unwrap();

    let loaded = AcousticModel::from_path(&path, &phones).unwrap();
    assert_eq!(loaded.dim(), 2);
    assert_eq!(loaded.states().len(), 2);
    assert_eq!(loaded.states()[0].id(), 0);
    assert_eq!(loaded.states()[1].id(), 1);
    assert_eq!(loaded.states()[1].phone(), 1);
    assert_eq!(loaded.states()[1].mixture_size(), 2);

    // Byte-identical re-save.
    let mut first = Vec::new();
    model.write_to(&mut first, &phones).unwrap();
    let mut second = Vec::new();
    loaded.write_to(&mut second, &phones).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_model_file_rejects_bad_magic() {
    let phones = phones();
    let bytes = b"XXXX\x01\x00\x00\x00\x02\x00\x00\x00\x01\x00\x00\x00";
    assert!(matches!(
        AcousticModel::read_from(&mut bytes.as_slice(), &phones),
        Err(SadError::InvalidInput(_))
    ));
}

#[test]
fn test_model_file_rejects_bad_version() {
    let phones = phones();
    let bytes = b"SADM\x09\x00\x00\x00\x02\x00\x00\x00\x01\x00\x00\x00";
    assert!(matches!(
        AcousticModel::read_from(&mut bytes.as_slice(), &phones),
        Err(SadError::InvalidInput(_))
    ));
}

#[test]
fn test_model_rejects_mixed_dimensionality() {
    let a = HmmState::new(
        0,
        0,
        0,
        0,
        2,
        vec![Gaussian::new(-1, 1.0, vec![0.0, 0.0], vec![1.0, 1.0])],
    )
    .unwrap();
    let b = HmmState::new(
        1,
        0,
        0,
        1,
        3,
        vec![Gaussian::new(-1, 1.0, vec![0.0; 3], vec![1.0; 3])],
    )
    .unwrap();
    assert!(AcousticModel::new(2, vec![a, b]).is_err());
}
