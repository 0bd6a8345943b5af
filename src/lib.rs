// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Sadkit - speech-activity detection and Gaussian-mixture acoustic scoring.
//!
//! Sadkit is the acoustic-evaluation and segmentation core of a speech
//! pipeline: it scores feature frames under Gaussian-mixture HMM-state
//! emission models and splits a stream into speech and non-speech regions
//! with a two-class Viterbi decoder.
//!
//! The pieces fit together like this: a [`phones::PhoneSet`] names the
//! acoustic units; an [`acoustic::codec::AcousticModel`] holds their
//! Gaussian-mixture [`acoustic::state::HmmState`]s loaded from the binary
//! model format; a [`sad::engine::SadEngine`] pools those mixtures into one
//! silence and one speech class and decodes sessions of feature batches
//! into [`sad::segment::SpeechSegment`]s.

pub mod acoustic;
pub mod error;
pub mod mappings;
pub mod phones;
pub mod prelude;
pub mod sad;
