// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Crate-wide error type.

use thiserror::Error;

/// Errors surfaced by model loading, acoustic evaluation and SAD sessions.
///
/// Numeric clamping at [`LOG_LIKELIHOOD_FLOOR`](crate::acoustic::LOG_LIKELIHOOD_FLOOR)
/// is defined behavior and never reported through this type.
#[derive(Debug, Error)]
pub enum SadError {
    /// Malformed text files, mismatched dimensions, or inconsistent segments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A SAD session ended with fewer frames than the topology requires.
    #[error("insufficient data: {have} frames fed, minimum required: {need}")]
    InsufficientData { have: usize, need: usize },

    /// Underlying file open/read/write failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-finite values or uninvertible covariance during initialization.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Operations out of protocol order, e.g. double initialization.
    #[error("state error: {0}")]
    State(String),
}
