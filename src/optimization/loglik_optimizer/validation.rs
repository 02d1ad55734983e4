//! Consistency checks shared by the optimizer configuration, the argmin
//! adapter and outcome construction.
//!
//! Each helper returns the first offending value as a specific [`OptError`]
//! variant so callers can report exactly which field or index was bad.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta},
};

/// Check an optional tolerance: `None` passes, `Some(tol)` must be finite and > 0.
///
/// `make_err` builds the field-specific error so gradient and cost tolerances
/// share one code path.
fn verify_positive_tol(
    tol: Option<f64>, make_err: fn(f64, &'static str) -> OptError,
) -> OptResult<()> {
    match tol {
        Some(tol) if !tol.is_finite() => Err(make_err(tol, "Tolerance must be finite.")),
        Some(tol) if tol <= 0.0 => Err(make_err(tol, "Tolerance must be positive.")),
        _ => Ok(()),
    }
}

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    verify_positive_tol(tol, |tol, reason| OptError::InvalidTolGrad { tol, reason })
}

/// Validate the optional cost-change tolerance.
///
/// # Errors
/// [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    verify_positive_tol(tol, |tol, reason| OptError::InvalidTolCost { tol, reason })
}

/// Validate a gradient: length `dim` and all entries finite.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] on a length mismatch.
/// - [`OptError::InvalidGradient`] for the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match grad.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidGradient {
            index,
            value: grad[index],
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Validate a starting vector: expected length and finite entries.
///
/// Used by [`LogLikelihood::check`](super::LogLikelihood::check)
/// implementations before each optimization attempt.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] on a length mismatch.
/// - [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta_input(theta: &Theta, expected: usize) -> OptResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    match theta.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
        None => Ok(()),
    }
}

/// Unwrap the best parameter vector reported by the solver.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if the solver recorded none.
/// - [`OptError::InvalidThetaHat`] if any entry is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = theta_hat.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: theta_hat[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta_hat)
}

/// A log-likelihood value may be negative but must be finite.
///
/// # Errors
/// [`OptError::NonFiniteCost`] for `NaN` / `±∞`.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Absent tolerances are accepted; zero, negative and non-finite ones are
    // rejected with the field-specific variant.
    fn tolerance_checks_reject_non_positive_and_non_finite() {
        assert!(verify_tol_grad(None).is_ok());
        assert!(verify_tol_cost(Some(1e-8)).is_ok());

        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(-1.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(
            verify_tol_grad(Some(f64::INFINITY)),
            Err(OptError::InvalidTolGrad { reason: "Tolerance must be finite.", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `validate_grad` reports the dimension mismatch before looking at values,
    // and the index of the first non-finite entry otherwise.
    fn validate_grad_reports_dimension_then_first_bad_index() {
        let short = array![1.0];
        let bad = array![1.0, f64::NAN, f64::INFINITY];

        assert_eq!(
            validate_grad(&short, 3),
            Err(OptError::GradientDimMismatch { expected: 3, found: 1 })
        );
        assert!(matches!(validate_grad(&bad, 3), Err(OptError::InvalidGradient { index: 1, .. })));
        assert!(validate_grad(&array![0.0, -2.0, 3.0], 3).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Starting vectors must match the model layout and be finite.
    fn validate_theta_input_checks_length_and_finiteness() {
        assert_eq!(
            validate_theta_input(&array![0.0, 1.0], 3),
            Err(OptError::ThetaLengthMismatch { expected: 3, actual: 2 })
        );
        assert!(matches!(
            validate_theta_input(&array![0.0, f64::NEG_INFINITY], 2),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
        assert!(validate_theta_input(&array![0.0, 1.0], 2).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Missing or non-finite estimates never make it into an outcome.
    fn validate_theta_hat_requires_present_finite_vector() {
        assert_eq!(validate_theta_hat(None), Err(OptError::MissingThetaHat));
        assert!(matches!(
            validate_theta_hat(Some(array![f64::NAN])),
            Err(OptError::InvalidThetaHat { index: 0, .. })
        ));
        assert_eq!(validate_theta_hat(Some(array![0.5])), Ok(array![0.5]));
        assert!(validate_value(-12.5).is_ok());
        assert!(validate_value(f64::NAN).is_err());
    }
}
