//! loglik_optimizer::builders — L-BFGS solver construction.
//!
//! The builders hide argmin's generic wiring: they pick the history size
//! (`opts.lbfgs_mem` or [`DEFAULT_LBFGS_MEM`]) and apply optional gradient /
//! cost tolerances. Initial parameters and the iteration cap are runtime
//! concerns applied by [`run_lbfgs`](super::run::run_lbfgs).
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search, tolerances from `opts`.
///
/// # Errors
/// `OptError` (via `From<argmin::core::Error>`) if argmin rejects a tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search, tolerances from `opts`.
///
/// # Errors
/// `OptError` (via `From<argmin::core::Error>`) if argmin rejects a tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply `tol_grad` / `tol_cost` when present; argmin defaults stay otherwise.
///
/// Generic over the line search so new L-BFGS variants can reuse it.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
