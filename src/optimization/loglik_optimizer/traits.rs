//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait a model implements to be fitted.
//! - [`MLEOptions`] and [`Tolerances`]: per-attempt solver configuration.
//! - [`LineSearcher`]: line search used inside L-BFGS.
//! - [`OptimOutcome`]: normalized result of a successful run.
//!
//! Convention: we *maximize* `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`. An analytic
//! gradient, when provided, is `∇ℓ(θ)`; the adapter flips the sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented log-likelihood interface.
///
/// Required:
/// - `value(&Theta, &Data)`: evaluate `ℓ(θ)`; invalid inputs and numerical
///   failures (e.g. a covariance that cannot be factorized) are returned as
///   `OptError`, never panics.
/// - `check(&Theta, &Data)`: reject a malformed starting point. Called once
///   per optimization attempt, before the solver starts.
///
/// Optional:
/// - `grad(&Theta, &Data)`: analytic `∇ℓ(θ)`. When left at the default the
///   adapter falls back to finite differences of the cost.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside the L-BFGS solver.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver configuration for a single optimization attempt.
///
/// Fields:
/// - `tols`: stopping rules.
/// - `line_searcher`: line search used by L-BFGS.
/// - `lbfgs_mem`: history size; `None` uses [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
///
/// Default: `tol_grad = 1e-5`, `tol_cost = 1e-9`, `max_iter = 200`,
/// More–Thuente, default memory. These match the stopping rules commonly used
/// for GP marginal-likelihood fits.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// Build options; numeric tolerances are validated by [`Tolerances::new`].
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(mem @ 0) = lbfgs_mem {
            return Err(OptError::InvalidLBFGSMem {
                mem,
                reason: "L-BFGS memory must be greater than zero.",
            });
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-5), tol_cost: Some(1e-9), max_iter: Some(200) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules for the solver.
///
/// Any field may be `None` but at least one must be set (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if let Some(max_iter @ 0) = max_iter {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result of a successful maximization.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best log-likelihood `ℓ(θ̂)` (not the cost).
/// - `converged`: the solver met a convergence criterion (not the
///   iteration cap or an interrupt).
/// - `status`: argmin termination status.
/// - `iterations`, `fn_evals`: solver counters of the successful attempt.
/// - `grad_norm`: norm of the last gradient, if argmin kept one.
/// - `attempts`: number of attempts used, including the successful one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub attempts: usize,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// Propagates [`validate_theta_hat`] / [`validate_value`] failures.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(
                reason @ (TerminationReason::SolverConverged | TerminationReason::TargetCostReached),
            ) => (true, format!("{:?}", TerminationStatus::Terminated(reason))),
            other => (false, format!("{other:?}")),
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm: grad.map(|g| g.l2_norm()),
            attempts: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively; anything else is rejected.
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MoreThuente".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "backtracking".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` requires at least one stopping rule and a positive
    // iteration cap.
    fn tolerances_require_a_stopping_rule() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { max_iter: 0, .. })
        ));
        assert!(Tolerances::new(None, None, Some(10)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Zero L-BFGS memory is a configuration error.
    fn mle_options_reject_zero_memory() {
        let tols = Tolerances::new(Some(1e-6), None, Some(50)).expect("valid tolerances");

        let res = MLEOptions::new(tols, LineSearcher::HagerZhang, Some(0));

        assert!(matches!(res, Err(OptError::InvalidLBFGSMem { mem: 0, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Outcome construction maps the termination status and computes the
    // gradient norm.
    fn outcome_maps_termination_and_grad_norm() {
        let out = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            -3.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .expect("outcome should be valid");

        assert!(out.converged);
        assert_eq!(out.iterations, 12);
        assert_eq!(out.attempts, 1);
        assert_eq!(out.grad_norm, Some(5.0));
        assert!(out.status.contains("SolverConverged"));
    }

    #[test]
    // Purpose
    // -------
    // Stopping at the iteration cap is not convergence.
    fn outcome_at_iteration_cap_is_not_converged() {
        let out = OptimOutcome::new(
            Some(array![0.5]),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            1,
            FnEvalMap::new(),
            None,
        )
        .expect("outcome should be valid");

        assert!(!out.converged);
        assert!(out.status.contains("MaxItersReached"));
    }
}
