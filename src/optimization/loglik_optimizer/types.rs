//! loglik_optimizer::types — numeric aliases, solver aliases and defaults.
//!
//! Purpose
//! -------
//! Keep the `ndarray` / argmin generics in one place so the rest of the
//! optimizer (and the surrogate models that implement [`LogLikelihood`])
//! only ever name `Theta`, `Grad` and `Cost`.
//!
//! Conventions
//! -----------
//! - `Theta` is the unconstrained hyperparameter vector. Positive
//!   hyperparameters (lengthscales, noise, task variances) are stored through
//!   a softplus map by the model layer; the optimizer never sees constraints.
//! - `Cost` is the argmin objective `c(θ) = -ℓ(θ)`.
//!
//! [`LogLikelihood`]: super::traits::LogLikelihood
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Unconstrained parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)`, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value seen by argmin (`c(θ) = -ℓ(θ)`).
pub type Cost = f64;

/// Function-evaluation counters reported by argmin (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default number of optimization attempts before a fit is declared failed.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Hager–Zhang line search over the crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search over the crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS with Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS with More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
