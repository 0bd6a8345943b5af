// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Acoustic modeling subsystem: Gaussian mixtures, HMM-state evaluation and
//! the binary model codec.

pub mod codec;
pub mod gaussian;
pub mod state;

/// Conventional feature dimensionality of the shipped acoustic models
/// (13 cepstral coefficients plus deltas and delta-deltas). The actual
/// dimensionality is carried by each model at runtime.
pub const DIM: usize = 39;

/// Number of emitting states per phone HMM, and the default number of
/// left-to-right sub-states per SAD class.
pub const HMM_STATES: usize = 3;

/// Floor applied to emission log-likelihoods. Scores that underflow or come
/// from unreachable lattice cells clamp here instead of propagating
/// non-finite values.
pub const LOG_LIKELIHOOD_FLOOR: f32 = -1.0e10;

/// Maximum length in bytes of a phonetic symbol. On disk a symbol occupies
/// `MAX_PHONE_SYMBOL_LEN + 1` NUL-padded bytes.
pub const MAX_PHONE_SYMBOL_LEN: usize = 8;
