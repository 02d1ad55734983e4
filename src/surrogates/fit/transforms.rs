//! Input and outcome transforms attached to a fitted model.
//!
//! - [`InputTransform`]: per-column affine scaling of the continuous columns
//!   of `X'`, chosen by [`get_scaler`] from the specification's policy.
//! - [`OutcomeStandardize`]: per-output standardization of the targets.
//!
//! Both are fitted once on the training data and frozen with the model, so
//! prediction applies exactly the training-time scaling.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::surrogates::{
    data::{InputFeature, Inputs, TransformedInputs},
    models::ScalerKind,
};

/// Ranges and standard deviations below this are replaced by 1.
const MIN_SCALE: f64 = 1e-8;

/// Affine input scaling over a subset of `X'` columns.
#[derive(Debug, Clone, PartialEq)]
pub enum InputTransform {
    /// `(x - lower) / (upper - lower)` per column.
    Normalize { columns: Vec<usize>, lower: Vec<f64>, upper: Vec<f64> },
    /// `(x - mean) / std` per column.
    Standardize { columns: Vec<usize>, mean: Vec<f64>, std: Vec<f64> },
    Identity,
}

impl InputTransform {
    pub fn kind(&self) -> ScalerKind {
        match self {
            InputTransform::Normalize { .. } => ScalerKind::Normalize,
            InputTransform::Standardize { .. } => ScalerKind::Standardize,
            InputTransform::Identity => ScalerKind::Identity,
        }
    }

    /// Columns of the matrix this transform rescales.
    pub fn columns(&self) -> &[usize] {
        match self {
            InputTransform::Normalize { columns, .. }
            | InputTransform::Standardize { columns, .. } => columns,
            InputTransform::Identity => &[],
        }
    }

    /// Scaled copy of `x`; columns not listed pass through.
    pub fn apply(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut out = x.to_owned();
        let (columns, shift, scale): (&[usize], Vec<f64>, Vec<f64>) = match self {
            InputTransform::Normalize { columns, lower, upper } => (
                columns.as_slice(),
                lower.clone(),
                lower.iter().zip(upper).map(|(l, u)| u - l).collect(),
            ),
            InputTransform::Standardize { columns, mean, std } => {
                (columns.as_slice(), mean.clone(), std.clone())
            }
            InputTransform::Identity => return out,
        };
        for (k, &col) in columns.iter().enumerate() {
            out.column_mut(col).mapv_inplace(|v| (v - shift[k]) / scale[k]);
        }
        out
    }

    /// Same transform after column `removed` is deleted from the matrix.
    ///
    /// Columns after `removed` shift down by one; statistics of `removed`
    /// itself, if it was scaled, are dropped.
    pub fn drop_column(self, removed: usize) -> Self {
        let reindex = |columns: Vec<usize>, a: Vec<f64>, b: Vec<f64>| {
            let mut kept = (Vec::new(), Vec::new(), Vec::new());
            for ((col, a), b) in columns.into_iter().zip(a).zip(b) {
                if col == removed {
                    continue;
                }
                kept.0.push(if col > removed { col - 1 } else { col });
                kept.1.push(a);
                kept.2.push(b);
            }
            kept
        };
        match self {
            InputTransform::Normalize { columns, lower, upper } => {
                let (columns, lower, upper) = reindex(columns, lower, upper);
                InputTransform::Normalize { columns, lower, upper }
            }
            InputTransform::Standardize { columns, mean, std } => {
                let (columns, mean, std) = reindex(columns, mean, std);
                InputTransform::Standardize { columns, mean, std }
            }
            InputTransform::Identity => InputTransform::Identity,
        }
    }
}

/// get_scaler — input transform for a scaling policy.
///
/// Parameters
/// ----------
/// - `inputs`: declarations that produced `x` (used to find which columns
///   came from continuous features).
/// - `policy`: the specification's scaler.
/// - `x`: the transformed training inputs.
///
/// Returns
/// -------
/// - `Identity` for the `Identity` policy or when there are no continuous
///   features.
/// - `Normalize`: bounds are the declared bounds widened to cover the
///   training data; a degenerate range is replaced by 1.
/// - `Standardize`: training mean and unbiased standard deviation; a
///   degenerate deviation (or a single row) is replaced by 1.
pub fn get_scaler(inputs: &Inputs, policy: ScalerKind, x: &TransformedInputs) -> InputTransform {
    let continuous: Vec<(usize, (f64, f64))> = inputs
        .features()
        .iter()
        .filter_map(|feat| match feat {
            InputFeature::Continuous { key, bounds } => x.position(key).map(|col| (col, *bounds)),
            _ => None,
        })
        .collect();
    if continuous.is_empty() {
        return InputTransform::Identity;
    }
    let columns: Vec<usize> = continuous.iter().map(|(col, _)| *col).collect();

    match policy {
        ScalerKind::Identity => InputTransform::Identity,
        ScalerKind::Normalize => {
            let (mut lower, mut upper) = (Vec::new(), Vec::new());
            for &(col, (lo, hi)) in &continuous {
                let data = x.matrix.column(col);
                let lo = data.iter().copied().fold(lo, f64::min);
                let mut hi = data.iter().copied().fold(hi, f64::max);
                if hi - lo < MIN_SCALE {
                    hi = lo + 1.0;
                }
                lower.push(lo);
                upper.push(hi);
            }
            InputTransform::Normalize { columns, lower, upper }
        }
        ScalerKind::Standardize => {
            let (mean, std) = columns
                .iter()
                .map(|&col| mean_and_std(x.matrix.column(col)))
                .unzip();
            InputTransform::Standardize { columns, mean, std }
        }
    }
}

/// Mean and unbiased standard deviation, with degenerate deviations set to 1.
fn mean_and_std(values: ArrayView1<f64>) -> (f64, f64) {
    let n = values.len();
    let mean = values.mean().unwrap_or(0.0);
    if n < 2 {
        return (mean, 1.0);
    }
    let std = values.std(1.0);
    (mean, if std < MIN_SCALE { 1.0 } else { std })
}

/// Per-output standardization of a target matrix with `m` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeStandardize {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl OutcomeStandardize {
    /// Fit column means and unbiased standard deviations of `y`.
    pub fn fit(y: ArrayView2<f64>) -> Self {
        let (means, stds): (Vec<f64>, Vec<f64>) =
            y.axis_iter(Axis(1)).map(mean_and_std).unzip();
        Self { means: Array1::from(means), stds: Array1::from(stds) }
    }

    /// Number of outputs.
    pub fn m(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }

    pub fn transform(&self, y: ArrayView2<f64>) -> Array2<f64> {
        (&y - &self.means) / &self.stds
    }

    /// Map a standardized mean and standard deviation of output `j` back to
    /// the original scale.
    pub fn untransform(&self, j: usize, mean: &mut Array1<f64>, std: &mut Array1<f64>) {
        let (mu, sd) = (self.means[j], self.stds[j]);
        mean.mapv_inplace(|v| v * sd + mu);
        std.mapv_inplace(|v| v * sd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogates::data::{Column, DataTable, InputPreprocessingSpecs};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Scaler selection per policy, bound widening, column reindexing after
    // the task column is dropped, and outcome standardization.
    // -------------------------------------------------------------------------

    fn fixture() -> (Inputs, TransformedInputs) {
        let inputs = Inputs::new(vec![
            InputFeature::continuous("x1", 0.0, 1.0),
            InputFeature::task("fid"),
            InputFeature::continuous("x2", 0.0, 10.0),
        ])
        .expect("valid inputs");
        let table = DataTable::new(vec![
            Column::numeric("x1", vec![0.0, 0.5, 2.0]),
            Column::numeric("fid", vec![0.0, 1.0, 1.0]),
            Column::numeric("x2", vec![5.0, 5.0, 5.0]),
        ])
        .expect("valid table");
        let x = inputs.transform(&table, &InputPreprocessingSpecs::new()).expect("transform");
        (inputs, x)
    }

    #[test]
    // Purpose
    // -------
    // Normalize covers continuous columns only and widens declared bounds to
    // the data.
    //
    // Given
    // -----
    // - x1 declared on [0, 1] with an observation at 2; x2 on [0, 10].
    //
    // Expect
    // ------
    // - Columns [0, 2]; x1 upper bound 2; x2 keeps [0, 10].
    fn normalize_widens_bounds_to_data() {
        let (inputs, x) = fixture();

        let t = get_scaler(&inputs, ScalerKind::Normalize, &x);

        assert_eq!(
            t,
            InputTransform::Normalize {
                columns: vec![0, 2],
                lower: vec![0.0, 0.0],
                upper: vec![2.0, 10.0],
            }
        );
        let scaled = t.apply(x.matrix.view());
        assert_relative_eq!(scaled[[2, 0]], 1.0);
        assert_relative_eq!(scaled[[0, 2]], 0.5);
        assert_eq!(scaled.column(1), x.matrix.column(1));
    }

    #[test]
    // Purpose
    // -------
    // Standardize uses the unbiased deviation and maps constant columns to
    // unit scale; Identity is chosen for the Identity policy.
    fn standardize_and_identity() {
        let (inputs, x) = fixture();

        let t = get_scaler(&inputs, ScalerKind::Standardize, &x);
        let identity = get_scaler(&inputs, ScalerKind::Identity, &x);

        match &t {
            InputTransform::Standardize { columns, mean, std } => {
                assert_eq!(columns, &vec![0, 2]);
                assert_relative_eq!(mean[0], 2.5 / 3.0);
                assert_relative_eq!(std[0], array![0.0, 0.5, 2.0].std(1.0));
                assert_eq!(std[1], 1.0);
            }
            other => panic!("expected Standardize, got {other:?}"),
        }
        assert_eq!(identity, InputTransform::Identity);
    }

    #[test]
    // Purpose
    // -------
    // Dropping the task column shifts later column indices down by one.
    fn drop_column_reindexes() {
        let t = InputTransform::Normalize {
            columns: vec![0, 2, 3],
            lower: vec![0.0, 1.0, 2.0],
            upper: vec![1.0, 2.0, 3.0],
        };

        let dropped = t.drop_column(1);

        assert_eq!(
            dropped,
            InputTransform::Normalize {
                columns: vec![0, 1, 2],
                lower: vec![0.0, 1.0, 2.0],
                upper: vec![1.0, 2.0, 3.0],
            }
        );
    }

    #[test]
    // Purpose
    // -------
    // Outcome standardization per column, and its inverse on predictions.
    fn outcome_standardize_round_trip() {
        let y = array![[1.0, 10.0], [3.0, 10.0]];

        let t = OutcomeStandardize::fit(y.view());
        let z = t.transform(y.view());
        let mut mean = array![z[[1, 0]]];
        let mut std = array![1.0];
        t.untransform(0, &mut mean, &mut std);

        assert_eq!(t.m(), 2);
        assert_relative_eq!(z[[0, 0]], -1.0 / 2f64.sqrt());
        assert_eq!(t.stds()[1], 1.0);
        assert_relative_eq!(mean[0], 3.0);
        assert_relative_eq!(std[0], 2f64.sqrt());
    }
}
