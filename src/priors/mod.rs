//! priors — prior descriptions, named presets and runtime prior objects.
//!
//! Purpose
//! -------
//! Describe the priors a surrogate specification can carry ([`Prior`],
//! [`LkjPrior`]), resolve the search space's named presets into concrete
//! `(noise, lengthscale)` pairs ([`build_prior`]), and materialize runtime
//! priors with log densities, modes and samplers ([`map_prior`],
//! [`map_lkj`]).
//!
//! Key behaviors
//! -------------
//! - Preset resolution is total over [`PriorPreset`]; parsing an unknown tag
//!   is [`PriorError::UnknownPriorKind`].
//! - Default objects come from explicit constructor functions
//!   (`botorch_noise_prior()`, `botorch_lkj_prior(n)`, …) called when a
//!   specification is built.
//! - Runtime Gamma priors wrap `statrs`; the LKJ covariance prior combines
//!   the LKJ correlation density with a Gamma prior on task standard
//!   deviations.
//!
//! Invariants & assumptions
//! ------------------------
//! - Runtime priors are only built from validated parameters (finite, > 0).
//! - Log densities are `-∞` outside the support instead of errors, so the
//!   optimizer sees a non-finite cost and the retry layer handles it.
//!
//! Testing notes
//! -------------
//! - Unit tests cover preset tables, tag parsing, parameter validation,
//!   Gamma closed forms, seeded sampling and LKJ normalization.

pub mod choice;
pub mod errors;
pub mod runtime;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::choice::{
    LkjPrior, Prior, PriorPreset, botorch_lengthscale_prior, botorch_lkj_prior,
    botorch_noise_prior, build_prior, mbo_lengthscale_prior, mbo_noise_prior,
};
pub use self::errors::{PriorError, PriorResult};
pub use self::runtime::{GammaPrior, LkjCovariancePrior, map_lkj, map_prior};

pub mod prelude {
    pub use super::choice::{LkjPrior, Prior, PriorPreset, build_prior};
    pub use super::errors::{PriorError, PriorResult};
    pub use super::runtime::{map_lkj, map_prior};
}
