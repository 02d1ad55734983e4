//! Execution helper: run an argmin solver on an adapted log-likelihood and
//! normalize the final state into an [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, State};

/// Run `solver` on `problem` starting at `theta0`.
///
/// Applies `opts.tols.max_iter` to the executor, logs `ℓ(θ₀)` at `trace`
/// level, runs, and converts the final state (best parameters, best
/// log-likelihood, status, counters, last gradient) into an [`OptimOutcome`].
///
/// # Errors
/// - Any argmin runtime error, including errors raised by the model's
///   `value` (recovered as the original `OptError`).
/// - Outcome validation errors (missing or non-finite `θ̂`, non-finite `ℓ`).
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if tracing::enabled!(tracing::Level::TRACE) {
        if let Ok(c0) = problem.cost(&theta0) {
            tracing::trace!(loglik = -c0, "initial state");
        }
    }
    let mut optimizer = Executor::new(problem, solver).configure(|state| state.param(theta0));
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
