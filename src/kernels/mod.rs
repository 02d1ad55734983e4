//! kernels — kernel descriptions and runtime covariance modules.
//!
//! Purpose
//! -------
//! Turn an abstract kernel description ([`KernelChoice`]) into a concrete
//! covariance module over a chosen subset of input columns
//! ([`build_kernel`]). Search-space tags are parsed here as well
//! ([`KernelTag`]), so an unknown tag fails where kernels are defined.
//!
//! Key behaviors
//! -------------
//! - Closed sum type over RBF, Matern (ν ∈ {1.5, 2.5}) and polynomial
//!   kernels; every `match` is exhaustive.
//! - [`build_kernel`] validates active dims (count, range, uniqueness) and
//!   records the priors attached to the kernel's parameters.
//! - [`CovarianceModule::evaluate`] computes `k(x1, x2)` for positive
//!   lengthscales / offset.
//!
//! Invariants & assumptions
//! ------------------------
//! - Polynomial kernels ignore ARD; their single parameter is the offset.
//! - Columns outside `active_dims` never influence a kernel value.
//!
//! Conventions
//! -----------
//! - Construction is pure: no logging, no randomness.
//! - Errors are [`KernelError`] values; the surrogate layer lifts them into
//!   its configuration errors.
//!
//! Testing notes
//! -------------
//! - Unit tests cover tag parsing, active-dims validation, parameter
//!   counts and closed-form kernel values.

pub mod choice;
pub mod covariance;
pub mod errors;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::choice::{KernelChoice, KernelTag, MAX_POLYNOMIAL_POWER, MaternNu};
pub use self::covariance::{CovarianceModule, KernelKind, build_kernel};
pub use self::errors::{KernelError, KernelResult};

pub mod prelude {
    pub use super::choice::{KernelChoice, KernelTag, MaternNu};
    pub use super::covariance::{CovarianceModule, build_kernel};
    pub use super::errors::{KernelError, KernelResult};
}
