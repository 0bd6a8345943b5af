// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! A single Gaussian mixture component with diagonal covariance.

use crate::error::SadError;

/// Storage form of a diagonal covariance vector.
///
/// Models are stored on disk with plain variances; evaluation needs the
/// reciprocal scaled form `1/(2σ²)`. The two forms are kept as distinct
/// variants so initialization and serialization dispatch exhaustively and
/// a double inversion is impossible.
#[derive(Debug, Clone, PartialEq)]
pub enum Covariance {
    /// Plain variances, as stored on disk.
    Original(Vec<f32>),
    /// Reciprocal scaled form `1/(2σ²)`, ready for Mahalanobis sums.
    Precomputed(Vec<f32>),
}

impl Covariance {
    /// The underlying vector regardless of form.
    pub fn values(&self) -> &[f32] {
        match self {
            Covariance::Original(v) | Covariance::Precomputed(v) => v,
        }
    }

    /// Whether the covariance has been inverted for evaluation.
    pub fn is_precomputed(&self) -> bool {
        matches!(self, Covariance::Precomputed(_))
    }
}

/// Parameters of one multivariate normal with diagonal covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    /// Identifier within the owning model, or -1 when unassigned.
    pub id: i32,
    /// Mixture weight in (0, 1].
    pub weight: f32,
    pub mean: Vec<f32>,
    pub covariance: Covariance,
    /// `ln(weight / ((2π)^(dim/2) · √det(Σ)))`, filled in by initialization.
    pub log_scale: f32,
}

impl Gaussian {
    /// Create a component from disk-form parameters (plain variances).
    pub fn new(id: i32, weight: f32, mean: Vec<f32>, variances: Vec<f32>) -> Self {
        Self {
            id,
            weight,
            mean,
            covariance: Covariance::Original(variances),
            log_scale: 0.0,
        }
    }

    /// Precompute the log-scaling constant and invert the covariance.
    ///
    /// This is a one-way transition: a second call finds the covariance
    /// already precomputed and fails rather than inverting inverted values.
    pub(crate) fn precompute(&mut self) -> Result<(), SadError> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(SadError::Numeric(format!(
                "gaussian {}: weight {} is not a finite positive value",
                self.id, self.weight
            )));
        }

        let variances = match &self.covariance {
            Covariance::Precomputed(_) => {
                return Err(SadError::State(format!(
                    "gaussian {}: covariance already precomputed",
                    self.id
                )));
            }
            Covariance::Original(v) => v,
        };

        let mut determinant = 1.0f64;
        for (i, &variance) in variances.iter().enumerate() {
            if !variance.is_finite() || variance <= 0.0 {
                return Err(SadError::Numeric(format!(
                    "gaussian {}: covariance[{}] = {} is not invertible",
                    self.id, i, variance
                )));
            }
            determinant *= f64::from(variance);
        }

        let dim = self.mean.len();
        let norm = (2.0 * std::f64::consts::PI).powf(dim as f64 / 2.0);
        let log_scale = (f64::from(self.weight) / (norm * determinant.sqrt())).ln();
        if !log_scale.is_finite() {
            return Err(SadError::Numeric(format!(
                "gaussian {}: log-scaling constant is not finite (determinant {})",
                self.id, determinant
            )));
        }

        let inverted = variances
            .iter()
            .map(|&v| (1.0 / (2.0 * f64::from(v))) as f32)
            .collect();
        self.log_scale = log_scale as f32;
        self.covariance = Covariance::Precomputed(inverted);
        Ok(())
    }
}
