//! Prior descriptions and the named presets of the hyperparameter search
//! space.
//!
//! All presets are Gamma priors parameterized as `Gamma(concentration, rate)`:
//!
//! | preset    | noise            | lengthscale     |
//! |-----------|------------------|-----------------|
//! | `botorch` | Gamma(1.1, 0.05) | Gamma(3.0, 6.0) |
//! | `mbo`     | Gamma(2.0, 4.0)  | Gamma(2.0, 0.2) |
//!
//! The default task-correlation prior is LKJ(η = 2) with a Gamma(2.0, 0.15)
//! prior on task standard deviations.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::priors::errors::{PriorError, PriorResult};

/// Abstract prior over a positive scalar hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Prior {
    Gamma { concentration: f64, rate: f64 },
}

impl Prior {
    /// Validated Gamma prior.
    ///
    /// # Errors
    /// [`PriorError::InvalidGammaParam`] if either parameter is non-finite or ≤ 0.
    pub fn gamma(concentration: f64, rate: f64) -> PriorResult<Self> {
        verify_gamma_param("concentration", concentration)?;
        verify_gamma_param("rate", rate)?;
        Ok(Prior::Gamma { concentration, rate })
    }
}

pub(crate) fn verify_gamma_param(param: &'static str, value: f64) -> PriorResult<()> {
    if !value.is_finite() {
        return Err(PriorError::InvalidGammaParam { param, value, reason: "must be finite" });
    }
    if value <= 0.0 {
        return Err(PriorError::InvalidGammaParam { param, value, reason: "must be positive" });
    }
    Ok(())
}

/// LKJ prior over a task covariance matrix.
///
/// The correlation part has density `∝ det(C)^(η-1)`; task standard
/// deviations follow `sd_prior`. `n_tasks` must equal the task count of the
/// surrogate that owns the prior; the specification keeps them in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LkjPrior {
    n_tasks: usize,
    eta: f64,
    sd_prior: Prior,
}

impl LkjPrior {
    /// # Errors
    /// - [`PriorError::InvalidLkjTaskCount`] if `n_tasks == 0`.
    /// - [`PriorError::InvalidLkjEta`] if `eta` is non-finite or ≤ 0.
    pub fn new(n_tasks: usize, eta: f64, sd_prior: Prior) -> PriorResult<Self> {
        if n_tasks == 0 {
            return Err(PriorError::InvalidLkjTaskCount { n_tasks });
        }
        if !eta.is_finite() || eta <= 0.0 {
            return Err(PriorError::InvalidLkjEta { eta });
        }
        Ok(Self { n_tasks, eta, sd_prior })
    }

    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn sd_prior(&self) -> &Prior {
        &self.sd_prior
    }

    /// Same prior over `n_tasks` tasks.
    ///
    /// # Errors
    /// [`PriorError::InvalidLkjTaskCount`] if `n_tasks == 0`.
    pub fn with_n_tasks(self, n_tasks: usize) -> PriorResult<Self> {
        LkjPrior::new(n_tasks, self.eta, self.sd_prior)
    }
}

/// Named prior families of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorPreset {
    Mbo,
    Botorch,
}

impl PriorPreset {
    pub const ALL: [PriorPreset; 2] = [PriorPreset::Mbo, PriorPreset::Botorch];

    pub fn as_str(self) -> &'static str {
        match self {
            PriorPreset::Mbo => "mbo",
            PriorPreset::Botorch => "botorch",
        }
    }
}

impl fmt::Display for PriorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses exactly `"mbo"` and `"botorch"`. Any other tag is an error, never
/// a silent fallback to `botorch`.
impl FromStr for PriorPreset {
    type Err = PriorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PriorPreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| PriorError::UnknownPriorKind { tag: s.to_string() })
    }
}

// ---- Preset constructors ----

pub fn botorch_noise_prior() -> Prior {
    Prior::Gamma { concentration: 1.1, rate: 0.05 }
}

pub fn botorch_lengthscale_prior() -> Prior {
    Prior::Gamma { concentration: 3.0, rate: 6.0 }
}

pub fn mbo_noise_prior() -> Prior {
    Prior::Gamma { concentration: 2.0, rate: 4.0 }
}

pub fn mbo_lengthscale_prior() -> Prior {
    Prior::Gamma { concentration: 2.0, rate: 0.2 }
}

/// Default task-correlation prior over `n_tasks` tasks.
///
/// # Errors
/// [`PriorError::InvalidLkjTaskCount`] if `n_tasks == 0`.
pub fn botorch_lkj_prior(n_tasks: usize) -> PriorResult<LkjPrior> {
    LkjPrior::new(n_tasks, 2.0, Prior::Gamma { concentration: 2.0, rate: 0.15 })
}

/// Resolve a preset into its `(noise prior, lengthscale prior)` pair.
pub fn build_prior(preset: PriorPreset) -> (Prior, Prior) {
    match preset {
        PriorPreset::Mbo => (mbo_noise_prior(), mbo_lengthscale_prior()),
        PriorPreset::Botorch => (botorch_noise_prior(), botorch_lengthscale_prior()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Each preset resolves to exactly its documented pair.
    fn presets_resolve_to_documented_pairs() {
        assert_eq!(
            build_prior("botorch".parse().expect("botorch")),
            (
                Prior::Gamma { concentration: 1.1, rate: 0.05 },
                Prior::Gamma { concentration: 3.0, rate: 6.0 }
            )
        );
        assert_eq!(
            build_prior("mbo".parse().expect("mbo")),
            (
                Prior::Gamma { concentration: 2.0, rate: 4.0 },
                Prior::Gamma { concentration: 2.0, rate: 0.2 }
            )
        );
    }

    #[test]
    // Purpose
    // -------
    // An unknown prior tag is a configuration error, including near-misses.
    fn unknown_prior_tag_is_rejected() {
        for bad in ["Botorch", "gpytorch", ""] {
            assert_eq!(
                bad.parse::<PriorPreset>(),
                Err(PriorError::UnknownPriorKind { tag: bad.to_string() })
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Gamma and LKJ constructors validate their parameters.
    fn constructors_validate_parameters() {
        assert!(matches!(
            Prior::gamma(0.0, 1.0),
            Err(PriorError::InvalidGammaParam { param: "concentration", .. })
        ));
        assert!(matches!(
            Prior::gamma(1.0, f64::NAN),
            Err(PriorError::InvalidGammaParam { param: "rate", .. })
        ));
        assert_eq!(botorch_lkj_prior(0), Err(PriorError::InvalidLkjTaskCount { n_tasks: 0 }));
        assert!(matches!(
            LkjPrior::new(2, -1.0, botorch_noise_prior()),
            Err(PriorError::InvalidLkjEta { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `with_n_tasks` changes only the task count.
    fn with_n_tasks_keeps_shape_parameters() {
        let lkj = botorch_lkj_prior(2).expect("valid");

        let resized = lkj.clone().with_n_tasks(5).expect("valid");

        assert_eq!(resized.n_tasks(), 5);
        assert_eq!(resized.eta(), lkj.eta());
        assert_eq!(resized.sd_prior(), lkj.sd_prior());
    }
}
