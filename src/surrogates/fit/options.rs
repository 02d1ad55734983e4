//! Training configuration of the fitting pipeline.
//!
//! - [`NumericConfig`]: numeric knobs of the GP model (noise floor, Cholesky
//!   jitter ladder), passed explicitly into model construction.
//! - [`FitOptions`]: solver options, restart budget and RNG seed.
use crate::{
    optimization::{
        errors::OptError,
        loglik_optimizer::{DEFAULT_MAX_ATTEMPTS, MLEOptions},
        numerical_stability::DEFAULT_JITTER_LADDER,
    },
    surrogates::errors::{SurrogateError, SurrogateResult},
};

/// Smallest observation-noise variance the likelihood allows.
pub const DEFAULT_MIN_NOISE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct NumericConfig {
    pub min_noise: f64,
    pub jitter_ladder: Vec<f64>,
}

impl NumericConfig {
    /// # Errors
    /// [`SurrogateError::InvalidSpecification`] if `min_noise` is not
    /// positive and finite, or a jitter value is negative or non-finite.
    pub fn new(min_noise: f64, jitter_ladder: Vec<f64>) -> SurrogateResult<Self> {
        if !(min_noise.is_finite() && min_noise > 0.0) {
            return Err(SurrogateError::InvalidSpecification {
                field: "min_noise",
                reason: format!("must be positive and finite, got {min_noise}"),
            });
        }
        if let Some(bad) = jitter_ladder.iter().find(|j| !(j.is_finite() && **j >= 0.0)) {
            return Err(SurrogateError::InvalidSpecification {
                field: "jitter_ladder",
                reason: format!("jitter must be non-negative and finite, got {bad}"),
            });
        }
        Ok(Self { min_noise, jitter_ladder })
    }
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self { min_noise: DEFAULT_MIN_NOISE, jitter_ladder: DEFAULT_JITTER_LADDER.to_vec() }
    }
}

/// Options of one `fit` call.
///
/// Default: [`MLEOptions::default`], 10 attempts, seed 0, default numerics.
/// Restart `k` of output `j` draws its start from an RNG seeded with
/// `seed + j`, so identical inputs give identical fits.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub mle_opts: MLEOptions,
    pub max_attempts: usize,
    pub seed: u64,
    pub numeric: NumericConfig,
}

impl FitOptions {
    /// # Errors
    /// [`SurrogateError::Optimization`] wrapping
    /// [`OptError::InvalidMaxAttempts`] if `max_attempts == 0`.
    pub fn new(
        mle_opts: MLEOptions, max_attempts: usize, seed: u64, numeric: NumericConfig,
    ) -> SurrogateResult<Self> {
        if max_attempts == 0 {
            return Err(OptError::InvalidMaxAttempts {
                max_attempts,
                reason: "At least one optimization attempt is required.",
            }
            .into());
        }
        Ok(Self { mle_opts, max_attempts, seed, numeric })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            mle_opts: MLEOptions::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: 0,
            numeric: NumericConfig::default(),
        }
    }
}
