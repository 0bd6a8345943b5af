// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! HMM-state emission evaluation over a Gaussian mixture.
//!
//! Scoring uses the nearest-neighbor approximation (max over component
//! log-densities instead of the mixture sum), which is the hot loop of
//! every downstream decoder. Three numerically pinned paths are provided:
//!
//! - [`emission`](HmmState::emission): cached, partial-distance elimination.
//! - [`nearest_neighbor_score`](HmmState::nearest_neighbor_score): plain
//!   reference loop, bit-identical to the PDE path.
//! - [`emission_exact`](HmmState::emission_exact): brute-force mixture sum
//!   over the original (non-inverted) covariance, for parity testing.

use crate::acoustic::gaussian::Gaussian;
use crate::acoustic::LOG_LIKELIHOOD_FLOOR;
use crate::error::SadError;

/// Timestamp value marking the emission cache as empty.
const CACHE_EMPTY: i32 = -1;

/// A named HMM state holding an ordered Gaussian mixture and a one-slot
/// emission cache keyed by global frame index.
///
/// The cache makes the state `&mut` to evaluate; parallel sessions should
/// clone their states rather than synchronize around one instance.
#[derive(Debug, Clone)]
pub struct HmmState {
    phone: u8,
    state: u8,
    /// Within-word position code. Deprecated, preserved for round-trips.
    position: u8,
    id: i32,
    dim: usize,
    components: Vec<Gaussian>,
    cache_timestamp: i32,
    cache_score: f32,
}

impl HmmState {
    /// Build a state over the given mixture.
    ///
    /// The mixture must be non-empty and every component must match `dim`.
    pub fn new(
        phone: u8,
        state: u8,
        position: u8,
        id: i32,
        dim: usize,
        components: Vec<Gaussian>,
    ) -> Result<Self, SadError> {
        if components.is_empty() {
            return Err(SadError::InvalidInput(format!(
                "hmm state {id}: empty Gaussian mixture"
            )));
        }
        for gaussian in &components {
            if gaussian.mean.len() != dim || gaussian.covariance.values().len() != dim {
                return Err(SadError::InvalidInput(format!(
                    "hmm state {id}: gaussian {} has dimensionality {}/{}, expected {dim}",
                    gaussian.id,
                    gaussian.mean.len(),
                    gaussian.covariance.values().len(),
                )));
            }
        }
        Ok(Self {
            phone,
            state,
            position,
            id,
            dim,
            components,
            cache_timestamp: CACHE_EMPTY,
            cache_score: 0.0,
        })
    }

    pub fn phone(&self) -> u8 {
        self.phone
    }

    /// State index within the phone HMM.
    pub fn state_index(&self) -> u8 {
        self.state
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn components(&self) -> &[Gaussian] {
        &self.components
    }

    pub fn mixture_size(&self) -> usize {
        self.components.len()
    }

    /// Whether [`initialize`](Self::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        self.components
            .iter()
            .all(|g| g.covariance.is_precomputed())
    }

    /// Precompute evaluation constants for every component.
    ///
    /// Replaces each covariance vector with `1/(2σ²)` and caches the
    /// log-scaling constant. One-way: a second call is a [`SadError::State`].
    /// Non-finite weights or non-positive variances are fatal
    /// ([`SadError::Numeric`]).
    pub fn initialize(&mut self) -> Result<(), SadError> {
        for gaussian in &mut self.components {
            gaussian.precompute()?;
        }
        self.reset_timestamp();
        Ok(())
    }

    /// Invalidate the emission cache.
    pub fn reset_timestamp(&mut self) {
        self.cache_timestamp = CACHE_EMPTY;
    }

    /// Floored emission log-likelihood of `features` at frame `t`.
    ///
    /// Cached per timestamp: a repeated request at the same `t` returns the
    /// stored score without recomputation. Uses partial-distance
    /// elimination; results are bit-identical to
    /// [`nearest_neighbor_score`](Self::nearest_neighbor_score).
    pub fn emission(&mut self, features: &[f32], t: i32) -> f32 {
        if t == self.cache_timestamp {
            return self.cache_score;
        }
        let score = self.nearest_neighbor_score_pde(features);
        self.cache_timestamp = t;
        self.cache_score = score;
        score
    }

    /// Nearest-neighbor score without partial-distance elimination.
    ///
    /// Reference path for parity tests; no caching.
    pub fn nearest_neighbor_score(&self, features: &[f32]) -> f32 {
        assert!(
            self.is_initialized(),
            "emission requested before initialize()"
        );
        debug_assert_eq!(features.len(), self.dim);

        let mut best = LOG_LIKELIHOOD_FLOOR;
        for gaussian in &self.components {
            let cov = gaussian.covariance.values();
            let acc = partial_distance(gaussian.log_scale, features, &gaussian.mean, cov);
            best = best.max(acc);
        }
        best
    }

    /// Nearest-neighbor score with partial-distance elimination.
    ///
    /// The inner loop is split at `dim/3` and `2·dim/3`; once the
    /// accumulator falls below the running best the remaining chunks are
    /// skipped. Subtracted terms are non-positive, so the early exit never
    /// changes the result.
    pub fn nearest_neighbor_score_pde(&self, features: &[f32]) -> f32 {
        assert!(
            self.is_initialized(),
            "emission requested before initialize()"
        );
        debug_assert_eq!(features.len(), self.dim);

        let first = self.dim / 3;
        let second = 2 * (self.dim / 3);
        let mut best = LOG_LIKELIHOOD_FLOOR;
        for gaussian in &self.components {
            let mean = &gaussian.mean;
            let cov = gaussian.covariance.values();

            let mut acc = partial_distance(
                gaussian.log_scale,
                &features[..first],
                &mean[..first],
                &cov[..first],
            );
            if acc > best {
                acc = partial_distance(
                    acc,
                    &features[first..second],
                    &mean[first..second],
                    &cov[first..second],
                );
                if acc > best {
                    acc = partial_distance(
                        acc,
                        &features[second..],
                        &mean[second..],
                        &cov[second..],
                    );
                    best = best.max(acc);
                }
            }
        }
        best
    }

    /// Brute-force emission over the mixture sum, for reference parity.
    ///
    /// Computes `ln(Σ_c w_c · N(x; μ_c, Σ_c))` using the original
    /// covariance form, floored and cached exactly like
    /// [`emission`](Self::emission). Models evaluated this way must not be
    /// initialized.
    pub fn emission_exact(&mut self, features: &[f32], t: i32) -> f32 {
        assert!(
            !self.is_initialized(),
            "brute-force emission requires covariance in original form"
        );
        debug_assert_eq!(features.len(), self.dim);

        if t == self.cache_timestamp {
            return self.cache_score;
        }

        let norm = (2.0 * std::f64::consts::PI).powf(self.dim as f64 / 2.0);
        let mut probability = 0.0f64;
        for gaussian in &self.components {
            let variances = gaussian.covariance.values();
            let mut determinant = 1.0f64;
            let mut exponent = 0.0f64;
            for ((feature, mean), variance) in
                features.iter().zip(&gaussian.mean).zip(variances)
            {
                determinant *= f64::from(*variance);
                let delta = f64::from(feature - mean);
                exponent += delta * delta / f64::from(*variance);
            }
            probability += f64::from(gaussian.weight) * (-0.5 * exponent).exp()
                / (norm * determinant.sqrt());
        }

        let mut score = probability.ln().max(f64::from(LOG_LIKELIHOOD_FLOOR)) as f32;
        if !score.is_finite() {
            score = LOG_LIKELIHOOD_FLOOR;
        }

        self.cache_timestamp = t;
        self.cache_score = score;
        score
    }

    /// Index and score of the best-scoring component for `features`.
    ///
    /// If every component scores at the floor, the first component is
    /// returned with the floor score. Ties between components go to the
    /// later one. No caching; used for adaptation-data routing.
    pub fn best_component(&self, features: &[f32]) -> (usize, f32) {
        assert!(
            self.is_initialized(),
            "emission requested before initialize()"
        );
        debug_assert_eq!(features.len(), self.dim);

        let first = self.dim / 3;
        let second = 2 * (self.dim / 3);
        let mut best = LOG_LIKELIHOOD_FLOOR;
        let mut best_index = None;
        for (index, gaussian) in self.components.iter().enumerate() {
            let mean = &gaussian.mean;
            let cov = gaussian.covariance.values();

            let mut acc = partial_distance(
                gaussian.log_scale,
                &features[..first],
                &mean[..first],
                &cov[..first],
            );
            if acc > best {
                acc = partial_distance(
                    acc,
                    &features[first..second],
                    &mean[first..second],
                    &cov[first..second],
                );
                if acc > best {
                    acc = partial_distance(
                        acc,
                        &features[second..],
                        &mean[second..],
                        &cov[second..],
                    );
                    if acc >= best {
                        best = acc;
                        best_index = Some(index);
                    }
                }
            }
        }

        match best_index {
            Some(index) if best > LOG_LIKELIHOOD_FLOOR => (index, best),
            _ => (0, LOG_LIKELIHOOD_FLOOR),
        }
    }

    /// Log-score of a single component (precomputed form) for `features`.
    pub fn component_score(&self, index: usize, features: &[f32]) -> f32 {
        assert!(
            self.is_initialized(),
            "emission requested before initialize()"
        );
        let gaussian = &self.components[index];
        partial_distance(
            gaussian.log_scale,
            features,
            &gaussian.mean,
            gaussian.covariance.values(),
        )
    }
}

/// Subtract the scaled squared distance over one chunk from `acc`.
#[inline]
fn partial_distance(mut acc: f32, features: &[f32], mean: &[f32], cov: &[f32]) -> f32 {
    for ((feature, mean), cov) in features.iter().zip(mean).zip(cov) {
        let delta = feature - mean;
        acc -= delta * delta * cov;
    }
    acc
}
