//! loglik_optimizer::finite_diff — finite-difference gradients with error capture.
//!
//! Purpose
//! -------
//! Supply gradients for log-likelihoods that do not implement
//! [`LogLikelihood::grad`](super::LogLikelihood::grad) (the Gaussian-process
//! marginal likelihood in this crate is one of them). The `finitediff` crate
//! wants a closure returning a bare `f64`, so evaluation errors are parked in
//! a `RefCell` slot and the closure returns `NaN`; after differencing, the
//! parked error is turned back into a real `Err`.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] tries central differences first and falls back to
//!   forward differences when an evaluation failed or the central gradient
//!   does not validate.
//! - [`run_fd_diff`] is the forward-difference leg with error capture and
//!   validation.
//!
//! Invariants & assumptions
//! ------------------------
//! - Gradients returned from this module always pass
//!   [`validate_grad`](super::validation::validate_grad).
//! - The objective is differenced in θ-space; any constrained ↔ unconstrained
//!   mapping is the model's business.
use crate::optimization::loglik_optimizer::{Grad, Theta, validation::validate_grad};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of `func` at `theta`.
///
/// `func` must report evaluation failures through `closure_err` and return
/// `NaN` in that case (see the module docs).
///
/// # Errors
/// - The first error parked in `closure_err` during the forward-difference
///   fallback.
/// - Gradient validation errors (wrong length, non-finite entries).
pub fn fd_gradient<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    let central = theta.central_diff(func);
    if closure_err.borrow().is_none() && validate_grad(&central, theta.len()).is_ok() {
        return Ok(central);
    }
    run_fd_diff(theta, func, closure_err)
}

/// Forward-difference gradient with error capture and validation.
///
/// Clears `closure_err`, differences `func`, and returns the parked error if
/// one was recorded; otherwise validates and returns the gradient.
///
/// # Errors
/// - The error parked in `closure_err`.
/// - [`OptError::GradientDimMismatch`](crate::optimization::errors::OptError::GradientDimMismatch)
///   / [`OptError::InvalidGradient`](crate::optimization::errors::OptError::InvalidGradient).
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Central/forward selection and error capture. Accuracy of `finitediff`
    // itself is not re-tested.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A smooth quadratic yields the analytic gradient 2θ via central
    // differences.
    //
    // Given
    // -----
    // - f(θ) = θ·θ at θ = (1, -2).
    //
    // Expect
    // ------
    // - Gradient ≈ (2, -4).
    fn fd_gradient_matches_quadratic() {
        // Arrange
        let theta = array![1.0, -2.0];
        let slot: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x.dot(x);

        // Act
        let grad = fd_gradient(&theta, &f, &slot).expect("gradient should succeed");

        // Assert
        approx::assert_abs_diff_eq!(grad[0], 2.0, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(grad[1], -4.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error raised by every evaluation is surfaced instead of a NaN
    // gradient.
    //
    // Given
    // -----
    // - A closure that always parks `NotPositiveDefinite` and returns NaN.
    //
    // Expect
    // ------
    // - `fd_gradient` returns that error.
    fn fd_gradient_surfaces_parked_error() {
        // Arrange
        let theta = array![0.5];
        let slot: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let mut s = slot.borrow_mut();
            if s.is_none() {
                *s = Some(OptError::NotPositiveDefinite { size: 1, jitter: 1e-6 }.into());
            }
            f64::NAN
        };

        // Act
        let err = fd_gradient(&theta, &f, &slot).expect_err("gradient should fail");

        // Assert
        assert_eq!(OptError::from(err), OptError::NotPositiveDefinite { size: 1, jitter: 1e-6 });
    }

    #[test]
    // Purpose
    // -------
    // Non-finite forward-difference gradients are rejected by validation.
    fn run_fd_diff_rejects_non_finite_gradient() {
        let theta = array![0.0];
        let slot: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| if x[0] > 0.0 { f64::INFINITY } else { 0.0 };

        let err = run_fd_diff(&theta, &f, &slot).expect_err("gradient should be invalid");

        assert!(matches!(OptError::from(err), OptError::InvalidGradient { index: 0, .. }));
    }
}
