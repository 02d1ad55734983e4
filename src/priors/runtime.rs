//! Runtime priors: log densities, modes and sampling for the objects
//! described in [`choice`](super::choice).
//!
//! The fitting pipeline uses the log densities inside the marginal
//! likelihood objective, the modes as the deterministic first starting
//! point, and the samplers to draw restart points.
use nalgebra::DMatrix;
use ndarray::ArrayView2;
use rand::{Rng, distributions::Distribution};
use statrs::{
    distribution::{Continuous, Gamma},
    function::beta::ln_beta,
};

use crate::{
    optimization::numerical_stability::{DEFAULT_JITTER_LADDER, chol_log_det, cholesky_with_jitter, to_dmatrix},
    priors::{
        choice::{LkjPrior, Prior, verify_gamma_param},
        errors::{PriorError, PriorResult},
    },
};

/// Gamma prior with shape `concentration` and inverse scale `rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct GammaPrior {
    concentration: f64,
    rate: f64,
    dist: Gamma,
}

impl GammaPrior {
    /// # Errors
    /// [`PriorError::InvalidGammaParam`] for non-finite or non-positive
    /// parameters; statrs rejections are wrapped in
    /// [`PriorError::GammaBackend`].
    pub fn new(concentration: f64, rate: f64) -> PriorResult<Self> {
        verify_gamma_param("concentration", concentration)?;
        verify_gamma_param("rate", rate)?;
        let dist = Gamma::new(concentration, rate)?;
        Ok(Self { concentration, rate, dist })
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// `log p(x)`; `-∞` outside the support.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        if x <= 0.0 || !x.is_finite() {
            return f64::NEG_INFINITY;
        }
        self.dist.ln_pdf(x)
    }

    pub fn mean(&self) -> f64 {
        self.concentration / self.rate
    }

    /// Mode `(α - 1) / β`. For `α ≤ 1` the mode sits on the boundary at 0,
    /// which is useless as a starting value, so the mean is returned instead.
    pub fn mode(&self) -> f64 {
        if self.concentration > 1.0 {
            (self.concentration - 1.0) / self.rate
        } else {
            self.mean()
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

/// Materialize an abstract prior.
///
/// # Errors
/// See [`GammaPrior::new`].
pub fn map_prior(prior: &Prior) -> PriorResult<GammaPrior> {
    match prior {
        Prior::Gamma { concentration, rate } => GammaPrior::new(*concentration, *rate),
    }
}

/// LKJ prior on a task covariance `B = D^½ C D^½`.
///
/// `log p(B) = (η - 1)·log det C - log c_T + Σ_i log p_sd(√B_ii)`,
/// where `c_T` is the LKJ normalizing constant for `T` tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct LkjCovariancePrior {
    n_tasks: usize,
    eta: f64,
    log_normalizer: f64,
    sd_prior: GammaPrior,
}

impl LkjCovariancePrior {
    pub fn n_tasks(&self) -> usize {
        self.n_tasks
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn sd_prior(&self) -> &GammaPrior {
        &self.sd_prior
    }

    /// Log density of a task covariance matrix.
    ///
    /// # Errors
    /// - [`PriorError::CovarianceDimMismatch`] if `cov` is not `T×T`.
    ///
    /// A matrix that is not positive definite has density 0 and yields
    /// `Ok(-∞)`.
    pub fn ln_pdf(&self, cov: ArrayView2<f64>) -> PriorResult<f64> {
        let (rows, cols) = cov.dim();
        if rows != self.n_tasks || cols != self.n_tasks {
            return Err(PriorError::CovarianceDimMismatch { expected: self.n_tasks, rows, cols });
        }
        let diag: Vec<f64> = (0..rows).map(|i| cov[[i, i]]).collect();
        if diag.iter().any(|&v| !(v > 0.0) || !v.is_finite()) {
            return Ok(f64::NEG_INFINITY);
        }
        let sd_term: f64 = diag.iter().map(|v| self.sd_prior.ln_pdf(v.sqrt())).sum();
        if self.n_tasks == 1 {
            return Ok(sd_term);
        }

        let b: DMatrix<f64> = to_dmatrix(cov);
        let log_det_b = match cholesky_with_jitter(b, &DEFAULT_JITTER_LADDER) {
            Ok((chol, _)) => chol_log_det(&chol),
            Err(_) => return Ok(f64::NEG_INFINITY),
        };
        let log_det_c = log_det_b - diag.iter().map(|v| v.ln()).sum::<f64>();
        Ok((self.eta - 1.0) * log_det_c - self.log_normalizer + sd_term)
    }
}

/// `log c_T` for the LKJ distribution over `T×T` correlation matrices.
///
/// `Σ_{k=1}^{T-1} [(2η - 2 + T - k)(T - k) ln 2 + (T - k) ln B(b_k, b_k)]`
/// with `b_k = η + (T - k - 1) / 2`.
fn lkj_log_normalizer(n_tasks: usize, eta: f64) -> f64 {
    let t = n_tasks as f64;
    (1..n_tasks)
        .map(|k| {
            let m = t - k as f64;
            let b = eta + (m - 1.0) / 2.0;
            (2.0 * eta - 2.0 + m) * m * std::f64::consts::LN_2 + m * ln_beta(b, b)
        })
        .sum()
}

/// Materialize an LKJ prior description.
///
/// # Errors
/// - [`PriorError::InvalidLkjTaskCount`] / [`PriorError::InvalidLkjEta`].
/// - Errors from mapping the standard-deviation prior.
pub fn map_lkj(prior: &LkjPrior) -> PriorResult<LkjCovariancePrior> {
    let checked = LkjPrior::new(prior.n_tasks(), prior.eta(), prior.sd_prior().clone())?;
    Ok(LkjCovariancePrior {
        n_tasks: checked.n_tasks(),
        eta: checked.eta(),
        log_normalizer: lkj_log_normalizer(checked.n_tasks(), checked.eta()),
        sd_prior: map_prior(checked.sd_prior())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priors::choice::{botorch_lkj_prior, botorch_noise_prior};
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Gamma density / mode / sampling against closed forms, and the LKJ
    // density: normalization for two tasks, monotonicity in the correlation
    // and rejection of non-PD matrices.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Gamma log density and mode match the closed forms.
    //
    // Given
    // -----
    // - Gamma(3, 6): log p(x) = 3 ln 6 - ln Γ(3) + 2 ln x - 6x, mode 1/3.
    fn gamma_density_and_mode() {
        let g = GammaPrior::new(3.0, 6.0).expect("valid");
        let x: f64 = 0.4;

        let expected = 3.0 * 6f64.ln() - 2f64.ln() + 2.0 * x.ln() - 6.0 * x;

        approx::assert_relative_eq!(g.ln_pdf(x), expected, epsilon = 1e-10);
        approx::assert_relative_eq!(g.mode(), 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(g.ln_pdf(-1.0), f64::NEG_INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Concentrations ≤ 1 fall back to the mean as a usable start.
    fn gamma_mode_falls_back_to_mean() {
        let g = GammaPrior::new(1.0, 4.0).expect("valid");

        assert_eq!(g.mode(), 0.25);
    }

    #[test]
    // Purpose
    // -------
    // Seeded sampling is reproducible and the sample mean is close to α/β.
    fn gamma_sampling_is_seeded() {
        let g = map_prior(&botorch_noise_prior()).expect("valid");
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);

        let xs: Vec<f64> = (0..4000).map(|_| g.sample(&mut a)).collect();
        let ys: Vec<f64> = (0..4000).map(|_| g.sample(&mut b)).collect();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;

        assert_eq!(xs, ys);
        assert!((mean - g.mean()).abs() < 0.1 * g.mean());
    }

    #[test]
    // Purpose
    // -------
    // For two tasks the correlation density integrates to one.
    //
    // Given
    // -----
    // - η = 2, unit variances, so only the LKJ term varies with r and the sd
    //   term is a constant offset.
    //
    // Expect
    // ------
    // - ∫ exp(log p(r) - sd_term) dr over (-1, 1) ≈ 1 (midpoint rule).
    fn lkj_two_task_density_is_normalized() {
        let lkj = map_lkj(&botorch_lkj_prior(2).expect("valid")).expect("valid");
        let sd_term = 2.0 * lkj.sd_prior().ln_pdf(1.0);
        let n = 4000;
        let h = 2.0 / n as f64;

        let integral: f64 = (0..n)
            .map(|i| {
                let r = -1.0 + (i as f64 + 0.5) * h;
                let lp = lkj.ln_pdf(array![[1.0, r], [r, 1.0]].view()).expect("valid shape");
                (lp - sd_term).exp() * h
            })
            .sum();

        approx::assert_abs_diff_eq!(integral, 1.0, epsilon = 1e-3);
    }

    #[test]
    // Purpose
    // -------
    // With η > 1 weaker correlation is more likely; non-PD matrices have
    // zero density; wrong sizes are errors.
    fn lkj_prefers_weak_correlation_and_rejects_bad_input() {
        let lkj = map_lkj(&botorch_lkj_prior(2).expect("valid")).expect("valid");

        let weak = lkj.ln_pdf(array![[1.0, 0.1], [0.1, 1.0]].view()).expect("shape");
        let strong = lkj.ln_pdf(array![[1.0, 0.9], [0.9, 1.0]].view()).expect("shape");
        let invalid = lkj.ln_pdf(array![[1.0, 2.0], [2.0, 1.0]].view()).expect("shape");

        assert!(weak > strong);
        assert_eq!(invalid, f64::NEG_INFINITY);
        assert!(matches!(
            lkj.ln_pdf(array![[1.0]].view()),
            Err(PriorError::CovarianceDimMismatch { expected: 2, rows: 1, cols: 1 })
        ));
    }
}
