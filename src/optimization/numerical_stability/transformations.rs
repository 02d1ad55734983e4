//! Numerically stable positivity transforms.
//!
//! GP hyperparameters that must stay strictly positive (lengthscales, noise
//! variance, task variances, polynomial offset) are optimized as
//! unconstrained reals and mapped through softplus. The naïve forms
//! overflow or lose precision in the tails, so both directions use the
//! explicit `x > 20.0` cutoff common in ML libraries.
//!
//! # Provided items
//! - [`SOFTPLUS_CUTOFF`]: threshold above which softplus is the identity in `f64`.
//! - [`POSITIVE_FLOOR`]: smallest value accepted by [`safe_softplus_inv`].
//! - [`safe_softplus`]: `ln(1 + exp(x))`, ℝ → (0, ∞).
//! - [`safe_softplus_inv`]: inverse of softplus, (0, ∞) → ℝ.

/// Above this input, `ln(1 + exp(x)) == x` to `f64` precision.
pub const SOFTPLUS_CUTOFF: f64 = 20.0;

/// Inputs to [`safe_softplus_inv`] are clamped to at least this value.
pub const POSITIVE_FLOOR: f64 = 1e-12;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For large `x`, `softplus(x) ≈ x`.
/// - Otherwise `ln1p(exp(x))`, which keeps precision for very negative `x`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: returns `t = ln(exp(x) - 1)`.
///
/// Uses `ln(expm1(x))` below the cutoff and the identity above it. Inputs
/// below [`POSITIVE_FLOOR`] are clamped so the result stays finite.
pub fn safe_softplus_inv(x: f64) -> f64 {
    let x = x.max(POSITIVE_FLOOR);
    if x > SOFTPLUS_CUTOFF { x } else { x.exp_m1().ln() }
}
