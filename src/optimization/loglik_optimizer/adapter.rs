//! Adapter exposing a [`LogLikelihood`] as an argmin problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing `c(θ) = -ℓ(θ)`. Analytic gradients are
//! negated; when a model has none, the **cost** closure is finite-differenced,
//! so that branch needs no sign flip.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::fd_gradient,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a [`LogLikelihood`] and its data to argmin's `CostFunction` and
/// `Gradient` traits.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `c(θ) = -ℓ(θ)`.
    ///
    /// # Errors
    /// Propagates the model's `OptError`; a non-finite `ℓ(θ)` becomes
    /// [`OptError::NonFiniteCost`].
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost.
    ///
    /// - Analytic: validate `∇ℓ(θ)` and return its negation.
    /// - [`OptError::GradientNotImplemented`]: finite differences of the cost
    ///   via [`fd_gradient`].
    /// - Any other model error is propagated.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                fd_gradient(theta, &cost_func, &closure_err)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    /// ℓ(θ) = -(θ - 1)·(θ - 1); optional analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            let d = theta - 1.0;
            Ok(-d.dot(&d))
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost is the negated log-likelihood.
    fn cost_is_negated_loglik() {
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());

        let c = adapter.cost(&array![3.0]).expect("cost should succeed");

        assert_eq!(c, 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Analytic and finite-difference gradient paths agree on the cost
    // gradient `2(θ - 1)`.
    fn analytic_and_fd_gradients_agree() {
        let analytic = Bowl { analytic: true };
        let numeric = Bowl { analytic: false };
        let theta = array![3.0, -1.0];

        let g_a = ArgMinAdapter::new(&analytic, &()).gradient(&theta).expect("analytic");
        let g_n = ArgMinAdapter::new(&numeric, &()).gradient(&theta).expect("numeric");

        assert_eq!(g_a, array![4.0, -4.0]);
        approx::assert_abs_diff_eq!(g_n[0], 4.0, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(g_n[1], -4.0, epsilon = 1e-5);
    }
}
