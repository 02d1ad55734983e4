//! Trained surrogate: frozen transforms, covariance structure and one fitted
//! GP posterior per output.
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{
    kernels::CovarianceModule,
    optimization::loglik_optimizer::OptimOutcome,
    priors::{LkjPrior, Prior},
    surrogates::{
        data::{DataTable, InputPreprocessingSpecs, Inputs, TransformedInputs},
        errors::{SurrogateError, SurrogateResult},
        fit::{
            gp::{GpHyperparameters, GpPosterior},
            transforms::{InputTransform, OutcomeStandardize},
        },
        models::RegressionMetric,
    },
};

/// Location of the task column in `X'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskColumn {
    pub key: String,
    pub index: usize,
    pub task_count: usize,
}

/// Fitted GP of one output column.
#[derive(Debug, Clone)]
pub struct OutputFit {
    key: String,
    posterior: GpPosterior,
    outcome: OptimOutcome,
}

impl OutputFit {
    pub(crate) fn new(key: String, posterior: GpPosterior, outcome: OptimOutcome) -> Self {
        Self { key, posterior, outcome }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn hyperparameters(&self) -> &GpHyperparameters {
        self.posterior.hyperparameters()
    }

    /// Optimizer diagnostics of the successful attempt.
    pub fn outcome(&self) -> &OptimOutcome {
        &self.outcome
    }
}

/// Posterior mean and standard deviation per row (rows) and output
/// (columns), on the original output scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    pub outputs: Vec<String>,
    pub mean: Array2<f64>,
    pub std: Array2<f64>,
}

/// A fitted GP surrogate. Multi-task models carry a [`TaskColumn`];
/// the quadratic surrogate does not.
#[derive(Debug, Clone)]
pub struct TrainedMultiTaskGp {
    pub(crate) inputs: Inputs,
    pub(crate) input_preprocessing_specs: InputPreprocessingSpecs,
    pub(crate) task: Option<TaskColumn>,
    pub(crate) input_transform: InputTransform,
    pub(crate) outcome_transform: Option<OutcomeStandardize>,
    pub(crate) covar_module: CovarianceModule,
    pub(crate) noise_prior: Prior,
    pub(crate) task_covar_prior: Option<LkjPrior>,
    pub(crate) outcomes: Vec<OutputFit>,
}

impl TrainedMultiTaskGp {
    pub fn covar_module(&self) -> &CovarianceModule {
        &self.covar_module
    }

    /// Columns of the spatial inputs (`X'` without the task column) the
    /// kernel acts on.
    pub fn active_dims(&self) -> &[usize] {
        self.covar_module.active_dims()
    }

    /// Index of the task column in `X'`.
    pub fn task_feature_index(&self) -> Option<usize> {
        self.task.as_ref().map(|t| t.index)
    }

    pub fn task_column(&self) -> Option<&TaskColumn> {
        self.task.as_ref()
    }

    pub fn input_transform(&self) -> &InputTransform {
        &self.input_transform
    }

    /// `Some` iff the output scaler was `Standardize`.
    pub fn outcome_transform(&self) -> Option<&OutcomeStandardize> {
        self.outcome_transform.as_ref()
    }

    /// Noise prior attached to the likelihood.
    pub fn noise_prior(&self) -> &Prior {
        &self.noise_prior
    }

    /// Task-correlation prior attached to the task kernel.
    pub fn task_covar_prior(&self) -> Option<&LkjPrior> {
        self.task_covar_prior.as_ref()
    }

    pub fn outcomes(&self) -> &[OutputFit] {
        &self.outcomes
    }

    /// predict — posterior mean and standard deviation for new rows.
    ///
    /// `features` is encoded and scaled exactly like the training table.
    /// Standard deviations are those of the latent function (no
    /// observation noise).
    ///
    /// # Errors
    /// - Preprocessing errors (missing columns, unknown categories).
    /// - [`SurrogateError::InvalidTaskValue`] for task values outside
    ///   `[0, task_count)`.
    pub fn predict(&self, features: &DataTable) -> SurrogateResult<Predictions> {
        let encoded = self.inputs.transform(features, &self.input_preprocessing_specs)?;
        let (x, tasks) = self.spatial_inputs(&encoded)?;
        let n = x.nrows();
        let m = self.outcomes.len();
        let mut mean = Array2::zeros((n, m));
        let mut std = Array2::zeros((n, m));

        for (j, fit) in self.outcomes.iter().enumerate() {
            let (mut mu, var) = fit.posterior.predict(x.view(), tasks.as_deref())?;
            let mut sd: Array1<f64> = var.mapv(f64::sqrt);
            if let Some(t) = &self.outcome_transform {
                t.untransform(j, &mut mu, &mut sd);
            }
            mean.column_mut(j).assign(&mu);
            std.column_mut(j).assign(&sd);
        }
        Ok(Predictions {
            outputs: self.outcomes.iter().map(|o| o.key.clone()).collect(),
            mean,
            std,
        })
    }

    /// Score predictions on `features` against `targets`, one value per
    /// output in declaration order.
    ///
    /// # Errors
    /// Prediction errors, [`SurrogateError::MissingOutputColumn`], and metric
    /// input errors.
    pub fn score(
        &self, features: &DataTable, targets: &DataTable, metric: RegressionMetric,
    ) -> SurrogateResult<Vec<f64>> {
        let preds = self.predict(features)?;
        preds
            .outputs
            .iter()
            .enumerate()
            .map(|(j, key)| {
                let observed =
                    targets.numeric(key, |key| SurrogateError::MissingOutputColumn { key })?;
                let predicted = preds.mean.column(j).to_vec();
                metric.evaluate(observed, &predicted)
            })
            .collect()
    }

    /// Split `X'` into scaled spatial inputs and task indices.
    pub(crate) fn spatial_inputs(
        &self, encoded: &TransformedInputs,
    ) -> SurrogateResult<(Array2<f64>, Option<Vec<usize>>)> {
        let (x, tasks) = split_task_column(encoded.matrix.view(), self.task.as_ref())?;
        Ok((self.input_transform.apply(x.view()), tasks))
    }
}

/// `X'` without the task column, plus validated task indices.
///
/// # Errors
/// [`SurrogateError::InvalidTaskValue`] for a value that is not an integer
/// in `[0, task_count)`.
pub(crate) fn split_task_column(
    x: ArrayView2<f64>, task: Option<&TaskColumn>,
) -> SurrogateResult<(Array2<f64>, Option<Vec<usize>>)> {
    let Some(task) = task else {
        return Ok((x.to_owned(), None));
    };
    let tasks = x
        .column(task.index)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            let valid = value.is_finite()
                && value.fract() == 0.0
                && value >= 0.0
                && value < task.task_count as f64;
            if valid {
                Ok(value as usize)
            } else {
                Err(SurrogateError::InvalidTaskValue {
                    key: task.key.clone(),
                    row,
                    value,
                    task_count: task.task_count,
                })
            }
        })
        .collect::<SurrogateResult<Vec<usize>>>()?;
    let keep: Vec<usize> = (0..x.ncols()).filter(|&c| c != task.index).collect();
    Ok((x.select(Axis(1), &keep), Some(tasks)))
}
