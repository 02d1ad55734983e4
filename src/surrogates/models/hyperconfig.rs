//! Hyperparameter search space of the multi-task GP and the rule that turns
//! one point of that space into a rewritten specification.
//!
//! The space is three categorical dimensions:
//!
//! | dimension | values                               |
//! |-----------|--------------------------------------|
//! | `kernel`  | `rbf`, `matern_1.5`, `matern_2.5`    |
//! | `prior`   | `mbo`, `botorch`                     |
//! | `ard`     | `True`, `False`                      |
//!
//! Search strategies (factorial, model-based, random) live outside this
//! crate; they only read [`MultiTaskGpHyperconfig::domain`] and feed chosen
//! points back through [`apply_hyperparameters`].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    kernels::{KernelChoice, KernelTag},
    priors::{PriorPreset, build_prior},
    surrogates::{
        errors::{SurrogateError, SurrogateResult},
        models::{metrics::RegressionMetric, multi_task::MultiTaskGpSpecification},
    },
};

/// Exploration strategy an external search driver should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HyperStrategy {
    #[default]
    Factorial,
    Sobo,
    Random,
}

/// One point of the search space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpacePoint {
    pub kernel: String,
    pub prior: String,
    pub ard: bool,
}

impl SearchSpacePoint {
    pub fn new(kernel: impl Into<String>, prior: impl Into<String>, ard: bool) -> Self {
        Self { kernel: kernel.into(), prior: prior.into(), ard }
    }

    /// Parse a candidate row produced by a search driver.
    ///
    /// The row maps dimension names to category strings; `ard` must be
    /// `"True"` or `"False"`. Tags are not validated here, only by
    /// [`apply_hyperparameters`].
    ///
    /// # Errors
    /// [`SurrogateError::InvalidHyperparameter`] for a missing dimension or
    /// an unparsable `ard` value.
    pub fn from_candidate(candidate: &BTreeMap<String, String>) -> SurrogateResult<Self> {
        let field = |key: &str| {
            candidate.get(key).cloned().ok_or_else(|| SurrogateError::InvalidHyperparameter {
                key: key.to_string(),
                value: String::new(),
            })
        };
        let ard = match field("ard")?.as_str() {
            "True" => true,
            "False" => false,
            other => {
                return Err(SurrogateError::InvalidHyperparameter {
                    key: "ard".to_string(),
                    value: other.to_string(),
                });
            }
        };
        Ok(Self { kernel: field("kernel")?, prior: field("prior")?, ard })
    }
}

/// Search-space declaration attached to a multi-task GP specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultiTaskGpHyperconfig {
    pub target_metric: RegressionMetric,
    pub hyperstrategy: HyperStrategy,
}

impl MultiTaskGpHyperconfig {
    pub fn new(target_metric: RegressionMetric, hyperstrategy: HyperStrategy) -> Self {
        Self { target_metric, hyperstrategy }
    }

    /// Categorical dimensions as `(name, categories)` in declaration order.
    pub fn domain(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("kernel", KernelTag::ALL.iter().map(|t| t.as_str()).collect()),
            ("prior", PriorPreset::ALL.iter().map(|p| p.as_str()).collect()),
            ("ard", vec!["True", "False"]),
        ]
    }

    /// Full factorial enumeration of the domain, kernel-major.
    pub fn points(&self) -> Vec<SearchSpacePoint> {
        let mut points = Vec::with_capacity(KernelTag::ALL.len() * PriorPreset::ALL.len() * 2);
        for kernel in KernelTag::ALL {
            for prior in PriorPreset::ALL {
                for ard in [true, false] {
                    points.push(SearchSpacePoint::new(kernel.as_str(), prior.as_str(), ard));
                }
            }
        }
        points
    }
}

/// apply_hyperparameters — rewrite a specification from a search-space point.
///
/// Resolves `point.prior` to its `(noise, lengthscale)` pair, then
/// `point.kernel` with `point.ard` and that lengthscale prior, and returns a
/// copy of `spec` with `noise_prior` and `kernel` replaced. Every other field
/// (including the task-correlation prior) is carried over.
///
/// # Errors
/// - [`SurrogateError::UnknownPriorKind`] for a prior tag other than
///   `mbo`/`botorch`.
/// - [`SurrogateError::UnknownKernelKind`] for a kernel tag other than
///   `rbf`/`matern_1.5`/`matern_2.5`.
///
/// `spec` is borrowed, so it is unchanged whatever the outcome.
pub fn apply_hyperparameters(
    spec: &MultiTaskGpSpecification, point: &SearchSpacePoint,
) -> SurrogateResult<MultiTaskGpSpecification> {
    let preset: PriorPreset = point.prior.parse()?;
    let (noise_prior, lengthscale_prior) = build_prior(preset);
    let tag: KernelTag = point.kernel.parse()?;
    let kernel = KernelChoice::from_tag(tag, point.ard, lengthscale_prior);

    Ok(spec.clone().with_noise_prior(noise_prior).with_kernel(kernel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        kernels::MaternNu,
        priors::{botorch_lengthscale_prior, botorch_noise_prior, mbo_lengthscale_prior, mbo_noise_prior},
        surrogates::data::{InputFeature, Inputs, Outputs},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Tag → kernel/prior mapping over the whole search space, rejection of
    // unknown tags with the input specification unchanged, candidate
    // parsing and domain enumeration.
    // -------------------------------------------------------------------------

    fn spec() -> MultiTaskGpSpecification {
        let inputs = Inputs::new(vec![
            InputFeature::continuous("x1", 0.0, 1.0),
            InputFeature::continuous("x2", 0.0, 1.0),
            InputFeature::task("fid"),
        ])
        .expect("valid inputs");
        let outputs = Outputs::new(vec!["y"]).expect("valid outputs");
        MultiTaskGpSpecification::new(inputs, outputs, 2).expect("valid spec")
    }

    #[test]
    // Purpose
    // -------
    // Every kernel × prior × ard combination maps to the documented kernel
    // and priors.
    //
    // Expect
    // ------
    // - `rbf` → Rbf, `matern_1.5` → Matern(1.5), `matern_2.5` → Matern(2.5).
    // - `botorch`/`mbo` select their (noise, lengthscale) pair.
    // - The ARD flag is carried and the LKJ prior is untouched.
    fn every_tag_maps_to_its_kernel_and_priors() {
        let base = spec();
        let presets = [
            ("botorch", botorch_noise_prior(), botorch_lengthscale_prior()),
            ("mbo", mbo_noise_prior(), mbo_lengthscale_prior()),
        ];

        for (prior_tag, noise, lengthscale) in presets {
            for ard in [true, false] {
                for (kernel_tag, expected) in [
                    ("rbf", KernelChoice::rbf(ard, lengthscale.clone())),
                    ("matern_1.5", KernelChoice::matern(MaternNu::OneAndHalf, ard, lengthscale.clone())),
                    ("matern_2.5", KernelChoice::matern(MaternNu::TwoAndHalf, ard, lengthscale.clone())),
                ] {
                    let point = SearchSpacePoint::new(kernel_tag, prior_tag, ard);

                    let updated = apply_hyperparameters(&base, &point).expect("known tags");

                    assert_eq!(updated.kernel(), &expected);
                    assert_eq!(updated.kernel().ard(), ard);
                    assert_eq!(updated.noise_prior(), &noise);
                    assert_eq!(updated.lkj_prior(), base.lkj_prior());
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // An unsupported Matern order fails and leaves the specification as it
    // was.
    fn unknown_kernel_tag_is_rejected() {
        let base = spec();
        let before = base.clone();
        let point = SearchSpacePoint::new("matern_3.0", "botorch", true);

        let err = apply_hyperparameters(&base, &point).expect_err("unknown tag");

        assert_eq!(err, SurrogateError::UnknownKernelKind { tag: "matern_3.0".into() });
        assert_eq!(base, before);
    }

    #[test]
    // Purpose
    // -------
    // An unknown prior tag is a configuration error.
    fn unknown_prior_tag_is_rejected() {
        let point = SearchSpacePoint::new("rbf", "hvarfner", false);

        let err = apply_hyperparameters(&spec(), &point).expect_err("unknown tag");

        assert_eq!(err, SurrogateError::UnknownPriorKind { tag: "hvarfner".into() });
    }

    #[test]
    // Purpose
    // -------
    // Candidate rows parse the "True"/"False" ARD strings and reject the rest.
    fn candidate_rows_parse_ard_strings() {
        let row = |ard: &str| {
            BTreeMap::from([
                ("kernel".to_string(), "rbf".to_string()),
                ("prior".to_string(), "mbo".to_string()),
                ("ard".to_string(), ard.to_string()),
            ])
        };

        assert_eq!(
            SearchSpacePoint::from_candidate(&row("False")).expect("valid row"),
            SearchSpacePoint::new("rbf", "mbo", false)
        );
        assert_eq!(
            SearchSpacePoint::from_candidate(&row("yes")),
            Err(SurrogateError::InvalidHyperparameter { key: "ard".into(), value: "yes".into() })
        );
    }

    #[test]
    // Purpose
    // -------
    // The default search space declares three dimensions and enumerates
    // twelve points, each of which applies cleanly.
    fn factorial_domain_has_twelve_points() {
        let config = MultiTaskGpHyperconfig::default();
        let base = spec();

        let domain = config.domain();
        let points = config.points();

        assert_eq!(domain.iter().map(|(name, _)| *name).collect::<Vec<_>>(), ["kernel", "prior", "ard"]);
        assert_eq!(points.len(), 12);
        assert_eq!(config.target_metric, RegressionMetric::Mae);
        assert_eq!(config.hyperstrategy, HyperStrategy::Factorial);
        for point in &points {
            assert!(apply_hyperparameters(&base, point).is_ok());
        }
    }
}
