//! Dense linear-algebra helpers shared by the GP likelihood and the
//! task-correlation prior.
//!
//! Kernel matrices are assembled in `ndarray` and factorized with
//! `nalgebra`; this module owns the bridge and the jittered Cholesky.
use nalgebra::{Cholesky, DMatrix, Dyn};
use ndarray::ArrayView2;

use crate::optimization::errors::{OptError, OptResult};

/// Default diagonal jitter ladder tried after a failed plain factorization.
pub const DEFAULT_JITTER_LADDER: [f64; 3] = [1e-8, 1e-7, 1e-6];

/// Copy a square `ndarray` matrix into a `nalgebra::DMatrix`.
///
/// Writes column by column to follow `DMatrix`'s column-major storage.
/// Symmetry is preserved, not enforced.
pub fn to_dmatrix(matrix: ArrayView2<f64>) -> DMatrix<f64> {
    let (rows, cols) = matrix.dim();
    let mut out = DMatrix::<f64>::zeros(rows, cols);
    for j in 0..cols {
        for i in 0..rows {
            out[(i, j)] = matrix[[i, j]];
        }
    }
    out
}

/// cholesky_with_jitter — factorize a symmetric matrix, adding diagonal
/// jitter when needed.
///
/// Parameters
/// ----------
/// - `matrix`: symmetric `n×n` matrix, consumed.
/// - `ladder`: increasing jitter values added to the diagonal, one per
///   retry, after the plain factorization fails.
///
/// Returns
/// -------
/// The Cholesky factorization and the jitter that made it succeed (`0.0`
/// when none was needed).
///
/// Errors
/// ------
/// - [`OptError::NotPositiveDefinite`] if every rung fails or the matrix
///   contains non-finite entries. The error carries the largest jitter
///   tried.
pub fn cholesky_with_jitter(
    matrix: DMatrix<f64>, ladder: &[f64],
) -> OptResult<(Cholesky<f64, Dyn>, f64)> {
    let n = matrix.nrows();
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(OptError::NotPositiveDefinite { size: n, jitter: 0.0 });
    }
    if let Some(chol) = Cholesky::new(matrix.clone()) {
        return Ok((chol, 0.0));
    }
    let mut last = 0.0;
    for &jitter in ladder {
        last = jitter;
        let mut jittered = matrix.clone();
        for i in 0..n {
            jittered[(i, i)] += jitter;
        }
        if let Some(chol) = Cholesky::new(jittered) {
            return Ok((chol, jitter));
        }
    }
    Err(OptError::NotPositiveDefinite { size: n, jitter: last })
}

/// `log|A|` from a Cholesky factor `A = L Lᵀ`.
pub fn chol_log_det(chol: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * chol.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // The ndarray → nalgebra bridge keeps element positions.
    fn to_dmatrix_preserves_layout() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];

        let m = to_dmatrix(a.view());

        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    // Purpose
    // -------
    // A positive-definite matrix factorizes without jitter and the log
    // determinant matches the closed form.
    fn cholesky_without_jitter() {
        let m = to_dmatrix(array![[4.0, 0.0], [0.0, 9.0]].view());

        let (chol, jitter) = cholesky_with_jitter(m, &DEFAULT_JITTER_LADDER).expect("PD matrix");

        assert_eq!(jitter, 0.0);
        approx::assert_relative_eq!(chol_log_det(&chol), 36f64.ln(), epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A singular PSD matrix is rescued by the jitter ladder; an indefinite
    // one is reported with the largest jitter tried.
    //
    // Given
    // -----
    // - [[1, 1], [1, 1]] (singular) and [[1, 2], [2, 1]] (indefinite).
    //
    // Expect
    // ------
    // - Success with positive jitter; `NotPositiveDefinite { size: 2, jitter: 1e-6 }`.
    fn jitter_ladder_rescues_or_reports() {
        let singular = to_dmatrix(array![[1.0, 1.0], [1.0, 1.0]].view());
        let indefinite = to_dmatrix(array![[1.0, 2.0], [2.0, 1.0]].view());

        let (_, jitter) =
            cholesky_with_jitter(singular, &DEFAULT_JITTER_LADDER).expect("jitter should help");
        let err = cholesky_with_jitter(indefinite, &DEFAULT_JITTER_LADDER).expect_err("indefinite");

        assert!(jitter > 0.0);
        assert_eq!(err, OptError::NotPositiveDefinite { size: 2, jitter: 1e-6 });
    }
}
