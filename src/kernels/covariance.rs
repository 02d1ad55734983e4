//! Runtime covariance modules.
//!
//! A [`CovarianceModule`] is the materialized form of a [`KernelChoice`]: it
//! knows its family, the input dimensionality it expects, the subset of
//! columns it reads (`active_dims`) and the priors on its parameters. It
//! evaluates covariance matrices for **positive** parameter values; mapping
//! from the optimizer's unconstrained space happens in the GP layer.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{
    kernels::{
        choice::{KernelChoice, MaternNu, verify_polynomial_power},
        errors::{KernelError, KernelResult},
    },
    priors::Prior,
};

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const SQRT_5: f64 = 2.236_067_977_499_79;

/// Covariance family of a module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelKind {
    Rbf,
    Matern(MaternNu),
    Polynomial { power: u32 },
}

/// Materialized covariance function over a fixed set of input columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceModule {
    kind: KernelKind,
    dimensionality: usize,
    active_dims: Vec<usize>,
    ard: bool,
    lengthscale_prior: Option<Prior>,
    offset_prior: Option<Prior>,
}

/// build_kernel — materialize a kernel description over chosen columns.
///
/// Parameters
/// ----------
/// - `choice`: kernel family, ARD flag and priors.
/// - `dimensionality`: number of columns of the point sets the module will
///   be evaluated on.
/// - `active_dims`: ordered, unique column indices the kernel reads.
///
/// Returns
/// -------
/// A [`CovarianceModule`] with `num_params()` equal to `|active_dims|` for
/// ARD stationary kernels, `1` otherwise.
///
/// Errors
/// ------
/// - [`KernelError::NoActiveDims`] for an empty `active_dims`.
/// - [`KernelError::InvalidActiveDims`] if `|active_dims| > dimensionality`.
/// - [`KernelError::ActiveDimOutOfRange`] / [`KernelError::DuplicateActiveDim`].
/// - [`KernelError::InvalidPolynomialPower`] for a polynomial power outside
///   `[1, MAX_POLYNOMIAL_POWER]`, including descriptions deserialized
///   without going through [`KernelChoice::polynomial`].
pub fn build_kernel(
    choice: &KernelChoice, dimensionality: usize, active_dims: &[usize],
) -> KernelResult<CovarianceModule> {
    if active_dims.is_empty() {
        return Err(KernelError::NoActiveDims);
    }
    if active_dims.len() > dimensionality {
        return Err(KernelError::InvalidActiveDims { dimensionality, active: active_dims.len() });
    }
    let mut seen = vec![false; dimensionality];
    for &dim in active_dims {
        if dim >= dimensionality {
            return Err(KernelError::ActiveDimOutOfRange { dim, dimensionality });
        }
        if seen[dim] {
            return Err(KernelError::DuplicateActiveDim { dim });
        }
        seen[dim] = true;
    }

    let (kind, offset_prior) = match choice {
        KernelChoice::Rbf { .. } => (KernelKind::Rbf, None),
        KernelChoice::Matern { nu, .. } => (KernelKind::Matern(*nu), None),
        KernelChoice::Polynomial { power, offset_prior } => {
            verify_polynomial_power(*power)?;
            (KernelKind::Polynomial { power: *power }, offset_prior.clone())
        }
    };

    Ok(CovarianceModule {
        kind,
        dimensionality,
        active_dims: active_dims.to_vec(),
        ard: choice.ard(),
        lengthscale_prior: choice.lengthscale_prior().cloned(),
        offset_prior,
    })
}

impl CovarianceModule {
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn active_dims(&self) -> &[usize] {
        &self.active_dims
    }

    pub fn ard(&self) -> bool {
        self.ard
    }

    pub fn lengthscale_prior(&self) -> Option<&Prior> {
        self.lengthscale_prior.as_ref()
    }

    pub fn offset_prior(&self) -> Option<&Prior> {
        self.offset_prior.as_ref()
    }

    /// Number of lengthscales (`0` for polynomial kernels).
    pub fn num_lengthscales(&self) -> usize {
        match self.kind {
            KernelKind::Polynomial { .. } => 0,
            _ if self.ard => self.active_dims.len(),
            _ => 1,
        }
    }

    /// Number of positive parameters consumed by [`evaluate`](Self::evaluate):
    /// the lengthscales, or the single offset of a polynomial kernel.
    pub fn num_params(&self) -> usize {
        match self.kind {
            KernelKind::Polynomial { .. } => 1,
            _ => self.num_lengthscales(),
        }
    }

    /// Covariance matrix `K[i, j] = k(x1[i], x2[j])`.
    ///
    /// `params` holds the positive kernel parameters (see
    /// [`num_params`](Self::num_params)).
    ///
    /// # Errors
    /// - [`KernelError::InputDimMismatch`] if either point set does not have
    ///   `dimensionality` columns.
    /// - [`KernelError::ParamLengthMismatch`] on a wrong parameter count.
    pub fn evaluate(
        &self, x1: ArrayView2<f64>, x2: ArrayView2<f64>, params: &[f64],
    ) -> KernelResult<Array2<f64>> {
        self.check_inputs(x1, params)?;
        self.check_inputs(x2, params)?;
        let mut out = Array2::zeros((x1.nrows(), x2.nrows()));
        for (i, a) in x1.outer_iter().enumerate() {
            for (j, b) in x2.outer_iter().enumerate() {
                out[[i, j]] = self.pair(a, b, params);
            }
        }
        Ok(out)
    }

    /// Prior variances `k(x[i], x[i])`.
    ///
    /// # Errors
    /// Same as [`evaluate`](Self::evaluate).
    pub fn evaluate_diag(&self, x: ArrayView2<f64>, params: &[f64]) -> KernelResult<Array1<f64>> {
        self.check_inputs(x, params)?;
        Ok(x.outer_iter().map(|row| self.pair(row, row, params)).collect())
    }

    fn check_inputs(&self, x: ArrayView2<f64>, params: &[f64]) -> KernelResult<()> {
        if x.ncols() != self.dimensionality {
            return Err(KernelError::InputDimMismatch {
                expected: self.dimensionality,
                found: x.ncols(),
            });
        }
        if params.len() != self.num_params() {
            return Err(KernelError::ParamLengthMismatch {
                expected: self.num_params(),
                found: params.len(),
            });
        }
        Ok(())
    }

    fn pair(&self, a: ArrayView1<f64>, b: ArrayView1<f64>, params: &[f64]) -> f64 {
        match self.kind {
            KernelKind::Polynomial { power } => {
                let dot: f64 = self.active_dims.iter().map(|&d| a[d] * b[d]).sum();
                (dot + params[0]).powi(power as i32)
            }
            KernelKind::Rbf => (-0.5 * self.scaled_sq_dist(a, b, params)).exp(),
            KernelKind::Matern(nu) => {
                let r = self.scaled_sq_dist(a, b, params).sqrt();
                match nu {
                    MaternNu::OneAndHalf => {
                        let s = SQRT_3 * r;
                        (1.0 + s) * (-s).exp()
                    }
                    MaternNu::TwoAndHalf => {
                        let s = SQRT_5 * r;
                        (1.0 + s + s * s / 3.0) * (-s).exp()
                    }
                }
            }
        }
    }

    fn scaled_sq_dist(&self, a: ArrayView1<f64>, b: ArrayView1<f64>, lengthscales: &[f64]) -> f64 {
        self.active_dims
            .iter()
            .enumerate()
            .map(|(k, &d)| {
                let l = if self.ard { lengthscales[k] } else { lengthscales[0] };
                let diff = (a[d] - b[d]) / l;
                diff * diff
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kernels::choice::MAX_POLYNOMIAL_POWER, priors::botorch_lengthscale_prior};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Active-dims validation, parameter counting and closed-form kernel
    // values at known distances.
    // -------------------------------------------------------------------------

    fn matern(nu: MaternNu, ard: bool) -> KernelChoice {
        KernelChoice::matern(nu, ard, botorch_lengthscale_prior())
    }

    #[test]
    // Purpose
    // -------
    // Active dims must fit the dimensionality, be unique and in range.
    fn build_kernel_validates_active_dims() {
        let choice = matern(MaternNu::TwoAndHalf, true);

        assert!(matches!(
            build_kernel(&choice, 2, &[0, 1, 2]),
            Err(KernelError::InvalidActiveDims { dimensionality: 2, active: 3 })
        ));
        assert_eq!(
            build_kernel(&choice, 3, &[0, 3]),
            Err(KernelError::ActiveDimOutOfRange { dim: 3, dimensionality: 3 })
        );
        assert_eq!(build_kernel(&choice, 3, &[1, 1]), Err(KernelError::DuplicateActiveDim { dim: 1 }));
        assert_eq!(build_kernel(&choice, 3, &[]), Err(KernelError::NoActiveDims));
    }

    #[test]
    // Purpose
    // -------
    // Polynomial powers are bounded even when the description bypasses the
    // checked constructor (e.g. deserialization).
    fn build_kernel_bounds_polynomial_power() {
        let huge = KernelChoice::Polynomial { power: u32::MAX, offset_prior: None };
        let zero = KernelChoice::Polynomial { power: 0, offset_prior: None };
        let max = KernelChoice::Polynomial { power: MAX_POLYNOMIAL_POWER, offset_prior: None };

        assert!(matches!(
            build_kernel(&huge, 2, &[0, 1]),
            Err(KernelError::InvalidPolynomialPower { power: u32::MAX, .. })
        ));
        assert!(matches!(
            build_kernel(&zero, 2, &[0, 1]),
            Err(KernelError::InvalidPolynomialPower { power: 0, .. })
        ));
        assert!(build_kernel(&max, 2, &[0, 1]).is_ok());
        assert!(KernelChoice::polynomial(MAX_POLYNOMIAL_POWER + 1).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Lengthscale count follows ARD over the active dims only.
    //
    // Given
    // -----
    // - Dimensionality 4 with active dims [0, 2].
    //
    // Expect
    // ------
    // - ARD: 2 lengthscales; shared: 1; polynomial: 1 offset, 0 lengthscales.
    fn parameter_counts_follow_ard() {
        let ard = build_kernel(&matern(MaternNu::OneAndHalf, true), 4, &[0, 2]).expect("ard");
        let shared = build_kernel(&matern(MaternNu::OneAndHalf, false), 4, &[0, 2]).expect("shared");
        let poly =
            build_kernel(&KernelChoice::polynomial(2).expect("power"), 4, &[0, 2]).expect("poly");

        assert_eq!((ard.num_lengthscales(), ard.num_params()), (2, 2));
        assert_eq!((shared.num_lengthscales(), shared.num_params()), (1, 1));
        assert_eq!((poly.num_lengthscales(), poly.num_params()), (0, 1));
        assert_eq!(ard.active_dims(), &[0, 2]);
    }

    #[test]
    // Purpose
    // -------
    // Kernel values at a unit scaled distance match the closed forms, and
    // inactive columns are ignored.
    fn kernel_values_match_closed_forms() {
        // Column 1 differs wildly but is not active.
        let x1 = array![[0.0, 100.0]];
        let x2 = array![[2.0, -100.0]];
        let rbf = build_kernel(
            &KernelChoice::rbf(false, botorch_lengthscale_prior()),
            2,
            &[0],
        )
        .expect("rbf");
        let m15 = build_kernel(&matern(MaternNu::OneAndHalf, true), 2, &[0]).expect("m15");
        let m25 = build_kernel(&matern(MaternNu::TwoAndHalf, true), 2, &[0]).expect("m25");

        // r = |0 - 2| / 2 = 1
        let k_rbf = rbf.evaluate(x1.view(), x2.view(), &[2.0]).expect("eval")[[0, 0]];
        let k_15 = m15.evaluate(x1.view(), x2.view(), &[2.0]).expect("eval")[[0, 0]];
        let k_25 = m25.evaluate(x1.view(), x2.view(), &[2.0]).expect("eval")[[0, 0]];

        approx::assert_relative_eq!(k_rbf, (-0.5f64).exp(), epsilon = 1e-12);
        approx::assert_relative_eq!(k_15, (1.0 + SQRT_3) * (-SQRT_3).exp(), epsilon = 1e-12);
        approx::assert_relative_eq!(
            k_25,
            (1.0 + SQRT_5 + 5.0 / 3.0) * (-SQRT_5).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    // Purpose
    // -------
    // Polynomial kernel is `(x·x' + c)^p`; stationary diagonals are 1.
    fn polynomial_and_diagonal_values() {
        let x = array![[1.0, 2.0], [0.5, -1.0]];
        let poly =
            build_kernel(&KernelChoice::polynomial(2).expect("power"), 2, &[0, 1]).expect("poly");
        let m25 = build_kernel(&matern(MaternNu::TwoAndHalf, false), 2, &[0, 1]).expect("m25");

        let k = poly.evaluate(x.view(), x.view(), &[1.0]).expect("eval");
        let d = m25.evaluate_diag(x.view(), &[0.7]).expect("diag");

        approx::assert_relative_eq!(k[[0, 1]], (0.5 - 2.0 + 1.0f64).powi(2), epsilon = 1e-12);
        approx::assert_relative_eq!(k[[0, 0]], 36.0, epsilon = 1e-12);
        assert_eq!(d, array![1.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Shape and parameter-count mismatches are errors, not panics.
    fn evaluate_rejects_mismatched_inputs() {
        let m25 = build_kernel(&matern(MaternNu::TwoAndHalf, true), 2, &[0, 1]).expect("m25");
        let x = array![[0.0, 1.0]];
        let wrong = array![[0.0, 1.0, 2.0]];

        assert_eq!(
            m25.evaluate(x.view(), wrong.view(), &[1.0, 1.0]),
            Err(KernelError::InputDimMismatch { expected: 2, found: 3 })
        );
        assert_eq!(
            m25.evaluate(x.view(), x.view(), &[1.0]),
            Err(KernelError::ParamLengthMismatch { expected: 2, found: 1 })
        );
    }
}
