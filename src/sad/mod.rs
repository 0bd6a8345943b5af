// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech-activity detection subsystem.
//!
//! A two-class left-to-right HMM (silence / speech) is evaluated over a
//! Viterbi lattice, one column per feature frame, and back-traced into a
//! list of speech segments with configurable transition penalty and
//! padding.

pub mod engine;
pub mod segment;

use serde::{Deserialize, Serialize};

use crate::acoustic::HMM_STATES;

/// Tunable parameters for SAD decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SadParams {
    /// Per-state cap on components pooled into the silence mixture
    /// (-1 keeps all of them).
    pub max_components_silence: i32,
    /// Per-state cap on components pooled into the speech mixture.
    /// Must be positive.
    pub max_components_speech: i32,
    /// Log-domain penalty added on every transition into the initial speech
    /// state, column 0 included. Typically negative. The speech-to-silence
    /// boundary carries no penalty.
    pub silence_to_speech_penalty: f32,
    /// Frames of context added on each side of a recovered segment, limited
    /// to half of the silence gap between neighbors.
    pub frames_padding: u32,
    /// Left-to-right sub-states per class; also the minimum dwell of each
    /// class in frames.
    pub states_per_class: usize,
}

impl Default for SadParams {
    fn default() -> Self {
        Self {
            max_components_silence: -1,
            max_components_speech: 32,
            silence_to_speech_penalty: -60.0,
            frames_padding: 25,
            states_per_class: HMM_STATES,
        }
    }
}
