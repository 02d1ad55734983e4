//! multitask_surrogates — multi-task Gaussian-process surrogates for
//! Bayesian optimization.
//!
//! Purpose
//! -------
//! Configure and fit the probabilistic surrogate models used inside a
//! Bayesian-optimization loop: a discrete search space over structural
//! choices (kernel family, prior family, ARD), a pure update rule mapping a
//! point of that space onto a model specification, and the fitting pipeline
//! that turns training data plus a specification into a trained model.
//!
//! Key behaviors
//! -------------
//! - [`kernels`]: RBF / Matern / polynomial kernel descriptions, search-space
//!   tags and runtime covariance modules over selected active dims.
//! - [`priors`]: Gamma and LKJ prior descriptions, the `mbo` / `botorch`
//!   presets and runtime prior densities.
//! - [`surrogates`]: specifications, the hyperparameter search space, the
//!   fitting pipeline and trained models.
//! - [`optimization`]: argmin-backed L-BFGS likelihood maximization with
//!   bounded restarts, positivity transforms and jittered Cholesky.
//!
//! Invariants & assumptions
//! ------------------------
//! - A multi-task specification's task-correlation prior always covers
//!   exactly `task_count` tasks.
//! - Configuration errors are fatal and never retried; only optimizer
//!   failures consume the restart budget.
//! - Fitting is synchronous and single-threaded.
//!
//! Downstream usage
//! ----------------
//! - Search drivers read [`MultiTaskGpHyperconfig`](surrogates::models::MultiTaskGpHyperconfig),
//!   rewrite a specification with
//!   [`apply_hyperparameters`](surrogates::models::apply_hyperparameters) and
//!   score the result of [`fit`](surrogates::fit::fit).
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/` runs complete fits.

pub mod kernels;
pub mod optimization;
pub mod priors;
pub mod surrogates;
