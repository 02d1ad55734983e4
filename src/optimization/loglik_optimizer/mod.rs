//! loglik_optimizer — argmin-powered log-likelihood maximization with bounded retry.
//!
//! Purpose
//! -------
//! Maximize log-likelihoods `ℓ(θ)` with L-BFGS. Callers implement
//! [`LogLikelihood`] and call [`maximize`] for a single run, or
//! [`maximize_with_restarts`] for the bounded-retry loop used when fitting
//! Gaussian-process hyperparameters (a bad start can make the covariance
//! matrix numerically singular; a fresh start usually fixes it).
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the argmin cost
//!   `c(θ) = -ℓ(θ)`, falling back to [`finite_diff`] gradients.
//! - [`builders`] construct L-BFGS with More–Thuente or Hager–Zhang line
//!   search; [`run::run_lbfgs`] executes and normalizes into [`OptimOutcome`].
//! - [`maximize_with_restarts`] separates fatal starting-point errors from
//!   retryable run failures and reports the attempt count.
//!
//! Invariants & assumptions
//! ------------------------
//! - User code implements `ℓ(θ)` and optionally `∇ℓ(θ)`, never the cost.
//! - [`LogLikelihood::value`] reports invalid inputs and numerical failures
//!   as [`OptError`](crate::optimization::errors::OptError).
//! - [`Tolerances`] and [`MLEOptions`] are validated on construction.
//!
//! Conventions
//! -----------
//! - [`Theta`] is `Array1<f64>` in unconstrained space.
//! - [`OptimOutcome::value`] is the log-likelihood, not the cost.
//!
//! Downstream usage
//! ----------------
//! - The GP marginal likelihood in `surrogates::fit::gp` implements
//!   [`LogLikelihood`]; the fitting pipeline drives it through
//!   [`maximize_with_restarts`] with starts drawn from the priors.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign conventions ([`adapter`]), solver wiring
//!   ([`builders`]), finite differences and validation, option invariants
//!   ([`traits`]) and retry accounting ([`api`]).

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximize, maximize_with_restarts};
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, DEFAULT_MAX_ATTEMPTS, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use multitask_surrogates::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::{maximize, maximize_with_restarts};
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
