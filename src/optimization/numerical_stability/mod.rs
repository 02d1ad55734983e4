//! numerical_stability — overflow-safe transforms for positive hyperparameters.
//!
//! Purpose
//! -------
//! Keep the scalar maps between the optimizer's unconstrained θ-space and
//! strictly positive model quantities in one place, so kernels, priors and
//! the GP likelihood share the same cutoffs.
//!
//! Key behaviors
//! -------------
//! - `safe_softplus` / `safe_softplus_inv` map ℝ ↔ (0, ∞) without overflow.
//! - [`linalg`] bridges `ndarray` matrices into `nalgebra` and factorizes
//!   them with a diagonal jitter ladder (`cholesky_with_jitter`).
//!
//! Conventions
//! -----------
//! - Pure helpers; no logging, no I/O.
//! - Domain validation (finite inputs, positivity of prior parameters)
//!   happens upstream in the prior and surrogate layers.
//! - A matrix that cannot be factorized is `OptError::NotPositiveDefinite`,
//!   which the retry layer treats as a recoverable attempt failure.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naïve formulas,
//!   tail behavior, and a proptest round trip of softplus and its inverse.
//! - Unit tests in [`linalg`] cover the jitter ladder and log determinants.

pub mod linalg;
pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::linalg::{DEFAULT_JITTER_LADDER, chol_log_det, cholesky_with_jitter, to_dmatrix};
pub use self::transformations::{
    POSITIVE_FLOOR, SOFTPLUS_CUTOFF, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::linalg::{cholesky_with_jitter, to_dmatrix};
    pub use super::transformations::{safe_softplus, safe_softplus_inv};
}
