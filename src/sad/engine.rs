// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Two-class Viterbi decoding of speech activity.
//!
//! The engine pools Gaussians from a wider HMM set into one silence and one
//! speech mixture, then decodes sessions over a left-to-right topology of
//! `2·n` states whose first `n` states share the silence emission and whose
//! last `n` share the speech emission. Minimum dwell per class is `n`
//! frames by construction.

use ndarray::ArrayView2;

use crate::acoustic::codec::AcousticModel;
use crate::acoustic::gaussian::Gaussian;
use crate::acoustic::state::HmmState;
use crate::error::SadError;
use crate::phones::PhoneSet;
use crate::sad::segment::SpeechSegment;
use crate::sad::SadParams;

/// Back-pointer value for cells with no predecessor (column 0 and
/// unreachable cells).
const NO_PRED: i16 = -1;

/// One cell of the Viterbi lattice.
#[derive(Debug, Clone, Copy)]
struct LatticeCell {
    score: f32,
    prev: i16,
}

impl LatticeCell {
    const UNREACHABLE: LatticeCell = LatticeCell {
        score: f32::NEG_INFINITY,
        prev: NO_PRED,
    };
}

/// Speech-activity detector over pooled silence and speech mixtures.
pub struct SadEngine {
    params: SadParams,
    silence: HmmState,
    speech: HmmState,
    dim: usize,
}

impl SadEngine {
    /// Pool the model's Gaussians into the two class mixtures and precompute
    /// their evaluation constants.
    ///
    /// Every state whose phone is the silence phone contributes to the
    /// silence mixture, everything else to the speech mixture. Each state's
    /// components are ranked by descending weight and truncated to the
    /// configured per-state budget; pooled weights are then renormalized to
    /// sum to 1 per class. The model must not be initialized yet — pooling
    /// needs covariance in original form.
    pub fn new(
        model: &AcousticModel,
        phones: &PhoneSet,
        params: SadParams,
    ) -> Result<Self, SadError> {
        if params.max_components_speech <= 0 {
            return Err(SadError::InvalidInput(format!(
                "max_components_speech must be positive, got {}",
                params.max_components_speech
            )));
        }
        if params.states_per_class == 0 || params.states_per_class > 1024 {
            return Err(SadError::InvalidInput(format!(
                "states_per_class must be in 1..=1024, got {}",
                params.states_per_class
            )));
        }
        if model
            .states()
            .iter()
            .any(|state| state.is_initialized())
        {
            return Err(SadError::State(
                "cannot pool SAD mixtures from an initialized model".to_string(),
            ));
        }

        let silence_phone = phones.silence();
        let mut pool_silence: Vec<Gaussian> = Vec::new();
        let mut pool_speech: Vec<Gaussian> = Vec::new();
        let mut weight_silence = 0.0f32;
        let mut weight_speech = 0.0f32;

        for state in model.states() {
            let mut ranked: Vec<&Gaussian> = state.components().iter().collect();
            ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

            let (pool, weight, budget) = if state.phone() == silence_phone {
                (
                    &mut pool_silence,
                    &mut weight_silence,
                    params.max_components_silence,
                )
            } else {
                (
                    &mut pool_speech,
                    &mut weight_speech,
                    params.max_components_speech,
                )
            };
            for (kept, gaussian) in ranked.into_iter().enumerate() {
                if budget >= 0 && kept as i32 >= budget {
                    break;
                }
                *weight += gaussian.weight;
                pool.push(gaussian.clone());
            }
        }

        if pool_silence.is_empty() || pool_speech.is_empty() {
            return Err(SadError::InvalidInput(format!(
                "model pools {} silence and {} speech components; both classes need at least one",
                pool_silence.len(),
                pool_speech.len()
            )));
        }

        for gaussian in &mut pool_silence {
            gaussian.weight /= weight_silence;
        }
        for gaussian in &mut pool_speech {
            gaussian.weight /= weight_speech;
        }

        tracing::debug!(
            "SAD mixtures pooled: {} silence components, {} speech components",
            pool_silence.len(),
            pool_speech.len()
        );

        let next_id = model.states().len() as i32;
        let mut silence = HmmState::new(
            u8::MAX,
            u8::MAX,
            u8::MAX,
            next_id,
            model.dim(),
            pool_silence,
        )?;
        let mut speech = HmmState::new(
            u8::MAX,
            u8::MAX,
            u8::MAX,
            next_id + 1,
            model.dim(),
            pool_speech,
        )?;
        silence.initialize()?;
        speech.initialize()?;

        Ok(Self {
            params,
            silence,
            speech,
            dim: model.dim(),
        })
    }

    pub fn params(&self) -> &SadParams {
        &self.params
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The pooled silence mixture.
    pub fn silence_state(&self) -> &HmmState {
        &self.silence
    }

    /// The pooled speech mixture.
    pub fn speech_state(&self) -> &HmmState {
        &self.speech
    }

    /// Start a decoding session. The returned session owns the lattice;
    /// dropping it frees all per-session memory.
    pub fn begin_session(&mut self) -> SadSession<'_> {
        self.silence.reset_timestamp();
        self.speech.reset_timestamp();
        SadSession {
            engine: self,
            lattice: Vec::new(),
            time: 0,
        }
    }
}

/// A single-utterance SAD session: a growing Viterbi lattice plus the
/// session clock.
///
/// The protocol is strictly linear: feed features in any number of
/// [`process_features`](Self::process_features) batches, then call
/// [`recover_segments`](Self::recover_segments). Frames are numbered
/// sequentially from 0 across batches.
pub struct SadSession<'a> {
    engine: &'a mut SadEngine,
    /// One row of `2·n` cells per fed frame, stored flat.
    lattice: Vec<LatticeCell>,
    time: usize,
}

impl<'a> SadSession<'a> {
    /// Number of frames fed so far.
    pub fn frames(&self) -> usize {
        self.time
    }

    /// Append a batch of feature vectors (one row per frame) and extend the
    /// lattice by one column each.
    pub fn process_features(&mut self, features: ArrayView2<'_, f32>) -> Result<(), SadError> {
        if features.ncols() != self.engine.dim {
            return Err(SadError::InvalidInput(format!(
                "feature dimensionality {} does not match model dimensionality {}",
                features.ncols(),
                self.engine.dim
            )));
        }
        for row in features.rows() {
            match row.as_slice() {
                Some(slice) => self.advance(slice),
                None => {
                    let owned = row.to_vec();
                    self.advance(&owned);
                }
            }
        }
        Ok(())
    }

    /// Fill the lattice column for the next frame.
    fn advance(&mut self, features: &[f32]) {
        let n = self.engine.params.states_per_class;
        let width = 2 * n;
        let t = self.time;
        let penalty = self.engine.params.silence_to_speech_penalty;

        self.lattice
            .resize(self.lattice.len() + width, LatticeCell::UNREACHABLE);

        if t == 0 {
            // Only the two initial states are live at column 0; entering
            // speech immediately costs the transition penalty.
            self.lattice[0].score = self.engine.silence.emission(features, 0);
            self.lattice[n].score = self.engine.speech.emission(features, 0) + penalty;
            self.time = 1;
            return;
        }

        let prev_base = (t - 1) * width;
        let cur_base = t * width;
        let t_i32 = t as i32;

        // Silence sub-states, sharing one emission score.
        let emission = self.engine.silence.emission(features, t_i32);
        for j in 0..n {
            let self_pred = if j < t {
                (self.lattice[prev_base + j].score, j as i16)
            } else {
                (f32::NEG_INFINITY, NO_PRED)
            };
            let left_pred = if j > 0 {
                (self.lattice[prev_base + j - 1].score, (j - 1) as i16)
            } else if t >= n {
                // Speech terminal into silence initial, no penalty.
                (
                    self.lattice[prev_base + 2 * n - 1].score,
                    (2 * n - 1) as i16,
                )
            } else {
                (f32::NEG_INFINITY, NO_PRED)
            };
            let (score, prev) = if left_pred.0 > self_pred.0 {
                left_pred
            } else {
                self_pred
            };
            self.lattice[cur_base + j] = LatticeCell {
                score: score + emission,
                prev,
            };
        }

        // Speech sub-states, sharing one emission score.
        let emission = self.engine.speech.emission(features, t_i32);
        for j in 0..n {
            let self_pred = if j < t {
                (self.lattice[prev_base + n + j].score, (n + j) as i16)
            } else {
                (f32::NEG_INFINITY, NO_PRED)
            };
            let left_pred = if j > 0 {
                (self.lattice[prev_base + n + j - 1].score, (n + j - 1) as i16)
            } else if t >= n {
                // Silence terminal into speech initial carries the penalty.
                (
                    self.lattice[prev_base + n - 1].score + penalty,
                    (n - 1) as i16,
                )
            } else {
                (f32::NEG_INFINITY, NO_PRED)
            };
            let (score, prev) = if left_pred.0 > self_pred.0 {
                left_pred
            } else {
                self_pred
            };
            self.lattice[cur_base + n + j] = LatticeCell {
                score: score + emission,
                prev,
            };
        }

        self.time = t + 1;
    }

    /// Back-trace the lattice into padded speech segments, in time order.
    ///
    /// Requires at least `states_per_class` frames; fewer is
    /// [`SadError::InsufficientData`].
    pub fn recover_segments(&self) -> Result<Vec<SpeechSegment>, SadError> {
        let n = self.engine.params.states_per_class;
        if self.time < n {
            return Err(SadError::InsufficientData {
                have: self.time,
                need: n,
            });
        }

        let width = 2 * n;
        let cell = |t: usize, j: usize| self.lattice[t * width + j];
        let last = self.time - 1;

        // Compare the two terminal states; ties go to speech.
        let silence_terminal = cell(last, n - 1);
        let speech_terminal = cell(last, 2 * n - 1);
        let (mut in_speech, mut current) = if silence_terminal.score > speech_terminal.score {
            (false, silence_terminal)
        } else {
            (true, speech_terminal)
        };

        let mut segments = Vec::new();
        let mut run_end = last;
        let mut t = last;
        while t > 0 {
            let prev = current.prev;
            debug_assert!(prev != NO_PRED, "back-trace fell off the winning path");
            let prev_speech = prev as usize >= n;
            if prev_speech != in_speech {
                // Class change between t-1 and t: the current run starts at t.
                if in_speech {
                    segments.push(SpeechSegment::new(t as u32, run_end as u32));
                }
                run_end = t - 1;
                in_speech = prev_speech;
            }
            current = cell(t - 1, prev as usize);
            t -= 1;
        }
        if in_speech {
            segments.push(SpeechSegment::new(0, run_end as u32));
        }
        segments.reverse();

        debug_assert!(segments
            .iter()
            .all(|s| (s.end - s.start) as usize >= n - 1));

        self.apply_padding(&mut segments);

        tracing::debug!(
            "recovered {} speech segments from {} frames",
            segments.len(),
            self.time
        );
        Ok(segments)
    }

    /// Expand each segment by up to `frames_padding` on both sides.
    ///
    /// An inter-segment gap is split between its neighbors: each side may
    /// take at most half of it (integer division), so padded segments stay
    /// strictly disjoint. The outermost edges clamp to the session bounds.
    fn apply_padding(&self, segments: &mut [SpeechSegment]) {
        if segments.is_empty() {
            return;
        }
        let padding = self.engine.params.frames_padding;
        let last_frame = (self.time - 1) as u32;
        let count = segments.len();

        // Gaps between the unpadded boundaries.
        let gaps: Vec<u32> = (0..count - 1)
            .map(|i| segments[i + 1].start - segments[i].end - 1)
            .collect();

        for i in 0..count {
            if i == 0 {
                segments[0].start = segments[0].start.saturating_sub(padding);
            } else {
                let advance = padding.min(gaps[i - 1] / 2);
                segments[i].start =
                    (segments[i].start - advance).max(segments[i - 1].end + 1);
            }
            if i == count - 1 {
                segments[i].end = (segments[i].end + padding).min(last_frame);
            } else {
                segments[i].end += padding.min(gaps[i] / 2);
            }
        }
    }

    /// Terminate the session, freeing the lattice.
    pub fn end(self) {}
}
