//! High-level entry points: a single L-BFGS maximization ([`maximize`]) and
//! the bounded-retry wrapper used by surrogate fitting
//! ([`maximize_with_restarts`]).
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// Maximize `ℓ(θ)` with L-BFGS and the line search chosen in `opts`.
///
/// Validates `theta0` with [`LogLikelihood::check`], then builds the solver
/// and runs it once.
///
/// # Errors
/// - Errors from `f.check` (malformed starting point).
/// - Solver construction errors.
/// - Runtime errors: line-search failures, model evaluation errors, invalid
///   final state.
/// - [`OptError::NotConverged`] if the solver stops at the iteration cap.
///
/// # Example
/// ```
/// use ndarray::array;
/// use multitask_surrogates::optimization::{
///     errors::OptResult,
///     loglik_optimizer::{maximize, LogLikelihood, MLEOptions, Theta},
/// };
///
/// struct Concave;
/// impl LogLikelihood for Concave {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Concave, array![0.3, -0.2], &(), &MLEOptions::default()).unwrap();
/// assert!(out.theta_hat.iter().all(|t| t.abs() < 1e-3));
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    run_attempt(f, theta0, data, opts)
}

/// Maximize `ℓ(θ)` with at most `max_attempts` optimization attempts.
///
/// Attempt `k` (0-based) starts at `next_start(k)`; callers typically return
/// a deterministic default for `k = 0` and prior samples afterwards.
///
/// - A starting point rejected by [`LogLikelihood::check`] is a configuration
///   problem: the error is returned immediately and not retried.
/// - A failing run (line-search failure, non-factorizable covariance,
///   non-finite value, iteration cap reached) is logged at `warn` level and
///   retried from the next start.
/// - The first successful attempt is returned with `attempts` set.
///
/// # Errors
/// - [`OptError::InvalidMaxAttempts`] if `max_attempts == 0`.
/// - Errors from `f.check`.
/// - [`OptError::AttemptsExhausted`] carrying the last failure once the
///   budget is used up.
pub fn maximize_with_restarts<F, S>(
    f: &F, data: &F::Data, opts: &MLEOptions, max_attempts: usize, mut next_start: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: FnMut(usize) -> Theta,
{
    if max_attempts == 0 {
        return Err(OptError::InvalidMaxAttempts {
            max_attempts,
            reason: "At least one optimization attempt is required.",
        });
    }
    let mut last_error = OptError::UnknownError;
    for attempt in 0..max_attempts {
        let theta0 = next_start(attempt);
        f.check(&theta0, data)?;
        match run_attempt(f, theta0, data, opts) {
            Ok(mut outcome) => {
                outcome.attempts = attempt + 1;
                tracing::debug!(
                    attempt,
                    loglik = outcome.value,
                    iterations = outcome.iterations,
                    status = %outcome.status,
                    "optimization attempt succeeded"
                );
                return Ok(outcome);
            }
            Err(err) => {
                tracing::warn!(attempt, max_attempts, error = %err, "optimization attempt failed");
                last_error = err;
            }
        }
    }
    Err(OptError::AttemptsExhausted { attempts: max_attempts, last_error: Box::new(last_error) })
}

/// One solver run. A run that stops without converging is an error so the
/// retry loop treats it like any other failed attempt.
fn run_attempt<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let outcome = run_solver(f, theta0, data, opts)?;
    if !outcome.converged {
        return Err(OptError::NotConverged {
            status: outcome.status,
            iterations: outcome.iterations,
        });
    }
    Ok(outcome)
}

fn run_solver<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{Cost, Tolerances};
    use ndarray::{Array1, array};
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Retry accounting and error classification of `maximize_with_restarts`,
    // plus a sanity check of `maximize` on a concave bowl. Line-search
    // internals belong to argmin.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ - 2)², failing with `NotPositiveDefinite` whenever the
    /// first coordinate of θ is negative.
    struct Fragile {
        evals: Cell<usize>,
    }

    impl LogLikelihood for Fragile {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            self.evals.set(self.evals.get() + 1);
            if theta[0] < 0.0 {
                return Err(OptError::NotPositiveDefinite { size: 1, jitter: 1e-6 });
            }
            Ok(-(theta[0] - 2.0).powi(2))
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != 1 {
                return Err(OptError::ThetaLengthMismatch { expected: 1, actual: theta.len() });
            }
            Ok(())
        }
    }

    /// ℓ(θ) = -((1 - a)² + 100 (b - a²)²); never fails, converges slowly.
    struct Rosenbrock;

    impl LogLikelihood for Rosenbrock {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            let (a, b) = (theta[0], theta[1]);
            Ok(-((1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)))
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }
    }

    fn opts() -> MLEOptions {
        let tols = Tolerances::new(Some(1e-8), None, Some(100)).expect("valid tolerances");
        MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options")
    }

    #[test]
    // Purpose
    // -------
    // `maximize` finds the optimum of a smooth concave objective.
    fn maximize_finds_bowl_optimum() {
        let f = Fragile { evals: Cell::new(0) };

        let out = maximize(&f, array![0.5], &(), &opts()).expect("fit should succeed");

        approx::assert_abs_diff_eq!(out.theta_hat[0], 2.0, epsilon = 1e-4);
        assert!(out.value <= 0.0 && out.value > -1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Failed attempts are retried from the next start and the attempt count
    // is reported.
    //
    // Given
    // -----
    // - Starts -1, -1, then 1; the objective errors for negative θ.
    //
    // Expect
    // ------
    // - Success with `attempts == 3`.
    fn restarts_retry_until_success() {
        let f = Fragile { evals: Cell::new(0) };
        let starts = [-1.0, -1.0, 1.0];

        let out = maximize_with_restarts(&f, &(), &opts(), 10, |k| array![starts[k.min(2)]])
            .expect("third attempt should succeed");

        assert_eq!(out.attempts, 3);
        approx::assert_abs_diff_eq!(out.theta_hat[0], 2.0, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // Exhausting the budget surfaces the last underlying failure.
    fn restarts_exhaustion_carries_last_error() {
        let f = Fragile { evals: Cell::new(0) };
        let mut calls = 0;

        let err = maximize_with_restarts(&f, &(), &opts(), 4, |_| {
            calls += 1;
            array![-1.0]
        })
        .expect_err("every attempt fails");

        assert_eq!(calls, 4);
        match err {
            OptError::AttemptsExhausted { attempts, last_error } => {
                assert_eq!(attempts, 4);
                assert_eq!(*last_error, OptError::NotPositiveDefinite { size: 1, jitter: 1e-6 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A run stopped by the iteration cap counts as a failed attempt.
    //
    // Given
    // -----
    // - A one-iteration cap on the Rosenbrock valley, started at (-1.2, 1).
    //
    // Expect
    // ------
    // - `maximize` reports `NotConverged`.
    // - The restart loop exhausts its budget with `NotConverged` as the last
    //   error.
    fn iteration_cap_is_retried_as_failure() {
        let tols = Tolerances::new(Some(1e-12), Some(1e-15), Some(1)).expect("valid tolerances");
        let capped = MLEOptions::new(tols, LineSearcher::MoreThuente, None).expect("valid options");
        let mut starts = 0;

        let single = maximize(&Rosenbrock, array![-1.2, 1.0], &(), &capped);
        let err = maximize_with_restarts(&Rosenbrock, &(), &capped, 3, |_| {
            starts += 1;
            array![-1.2, 1.0]
        })
        .expect_err("no attempt converges");

        assert!(matches!(single, Err(OptError::NotConverged { iterations: 1, .. })));
        match err {
            OptError::AttemptsExhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert_eq!(starts, 3);
                assert!(matches!(*last_error, OptError::NotConverged { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A start rejected by `check` is fatal: no retries, no evaluations.
    fn restarts_do_not_retry_check_failures() {
        let f = Fragile { evals: Cell::new(0) };

        let err = maximize_with_restarts(&f, &(), &opts(), 10, |_| Array1::zeros(3))
            .expect_err("malformed start");

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 1, actual: 3 });
        assert_eq!(f.evals.get(), 0);
        assert!(matches!(
            maximize_with_restarts(&f, &(), &opts(), 0, |_| array![1.0]),
            Err(OptError::InvalidMaxAttempts { max_attempts: 0, .. })
        ));
    }
}
