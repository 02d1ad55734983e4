//! optimization — likelihood maximization, positivity transforms, error surface.
//!
//! Purpose
//! -------
//! Provide the numerical engine used to fit surrogate hyperparameters:
//! an argmin-backed L-BFGS maximizer for log-likelihoods, a bounded-retry
//! wrapper over it, stable softplus transforms, and one error/result surface.
//! Callers implement a log-likelihood and obtain fitted parameters plus
//! diagnostics without touching solver internals.
//!
//! Key behaviors
//! -------------
//! - `loglik_optimizer`: [`maximize`](loglik_optimizer::maximize) and
//!   [`maximize_with_restarts`](loglik_optimizer::maximize_with_restarts),
//!   with finite-difference gradients when a model has no analytic one.
//! - `numerical_stability`: softplus maps between unconstrained θ and
//!   positive hyperparameters.
//! - `errors`: [`OptError`](errors::OptError) / [`OptResult`](errors::OptResult).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers work in unconstrained θ-space; positivity is the model's job.
//! - Numerical failures inside a likelihood (e.g. a covariance matrix that
//!   cannot be factorized) are `OptError` values, never panics, so the retry
//!   layer can classify them.
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; outcomes report `ℓ`.
//! - Inner numerics do not log. The retry wrapper emits `tracing` events per
//!   attempt; everything above it (the surrogate pipeline) owns spans.
//!
//! Downstream usage
//! ----------------
//! - `surrogates::fit` implements `LogLikelihood` for the exact GP marginal
//!   likelihood and calls `maximize_with_restarts`.
//! - Kernels and priors use `numerical_stability` to decode θ.
//!
//! Testing notes
//! -------------
//! - Submodule unit tests cover solver wiring, tolerance validation,
//!   retry accounting, finite-difference fallbacks and error conversion.
//! - The integration test fits complete surrogates through this layer.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
