//! Fitting pipeline: training tables + specification → trained surrogate.
//!
//! State machine:
//!
//! `Unfit → Transforming → ModelConstructed → Optimizing → {Fit, Failed}`
//!
//! - Before any state is entered, every declared output must be present and
//!   rows with non-finite outputs are dropped.
//! - **Transforming**: encode the raw features into `X'`, locate and
//!   validate the task column.
//! - **ModelConstructed**: split off the task column, fit the input and
//!   outcome transforms, build the covariance module over active dims
//!   `[0 .. d-2]`, materialize the noise, kernel and task-correlation
//!   priors.
//! - **Optimizing**: maximize the marginal likelihood of each output with
//!   bounded restarts (prior modes first, then seeded prior samples).
//!
//! Configuration errors stop the pipeline before optimization and are never
//! retried. A failure of any stage leaves no trained model behind.
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info, info_span};

use crate::{
    kernels::{KernelChoice, build_kernel},
    optimization::loglik_optimizer::maximize_with_restarts,
    priors::{LkjPrior, Prior, map_lkj, map_prior},
    surrogates::{
        data::{DataTable, InputPreprocessingSpecs, Inputs, Outputs},
        errors::{SurrogateError, SurrogateResult},
        fit::{
            gp::{ExactGp, GpPriors, GpTrainingData},
            options::FitOptions,
            trained::{OutputFit, Predictions, TaskColumn, TrainedMultiTaskGp, split_task_column},
            transforms::{OutcomeStandardize, get_scaler},
        },
        models::{MultiTaskGpSpecification, QuadraticSpecification, ScalerKind},
    },
};

/// Pipeline state of a [`MultiTaskGpSurrogate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    Unfit,
    Transforming,
    ModelConstructed,
    Optimizing,
    Fit,
    Failed,
}

/// Structure shared by every surrogate the pipeline can fit.
struct ModelStructure<'a> {
    inputs: &'a Inputs,
    outputs: &'a Outputs,
    specs: &'a InputPreprocessingSpecs,
    kernel: &'a KernelChoice,
    noise_prior: &'a Prior,
    scaler: ScalerKind,
    output_scaler: ScalerKind,
    task: Option<(&'a str, usize, &'a LkjPrior)>,
}

impl<'a> From<&'a MultiTaskGpSpecification> for ModelStructure<'a> {
    fn from(spec: &'a MultiTaskGpSpecification) -> Self {
        Self {
            inputs: spec.inputs(),
            outputs: spec.outputs(),
            specs: spec.input_preprocessing_specs(),
            kernel: spec.kernel(),
            noise_prior: spec.noise_prior(),
            scaler: spec.scaler(),
            output_scaler: spec.output_scaler(),
            task: Some((spec.task_feature_key(), spec.task_count(), spec.lkj_prior())),
        }
    }
}

impl<'a> From<&'a QuadraticSpecification> for ModelStructure<'a> {
    fn from(spec: &'a QuadraticSpecification) -> Self {
        Self {
            inputs: spec.inputs(),
            outputs: spec.outputs(),
            specs: spec.input_preprocessing_specs(),
            kernel: spec.kernel(),
            noise_prior: spec.noise_prior(),
            scaler: spec.scaler(),
            output_scaler: spec.output_scaler(),
            task: None,
        }
    }
}

/// fit — train a multi-task GP surrogate.
///
/// Parameters
/// ----------
/// - `spec`: validated specification, read-only.
/// - `features`: raw feature table; must contain every declared input,
///   including the task column.
/// - `targets`: one numeric column per declared output, same row count.
/// - `options`: solver options, restart budget and seed.
///
/// Errors
/// ------
/// - Configuration errors (missing columns, invalid task values, kernel or
///   prior construction) before any optimization.
/// - [`SurrogateError::EmptyTrainingData`] if no row has finite outputs.
/// - [`SurrogateError::FitFailed`] once `options.max_attempts` attempts have
///   failed for an output.
pub fn fit(
    spec: &MultiTaskGpSpecification, features: &DataTable, targets: &DataTable,
    options: &FitOptions,
) -> SurrogateResult<TrainedMultiTaskGp> {
    run_pipeline(ModelStructure::from(spec), features, targets, options, &mut |_| {})
}

/// Train the single-task quadratic surrogate with the same pipeline.
///
/// # Errors
/// As [`fit`], without task-column errors.
pub fn fit_quadratic(
    spec: &QuadraticSpecification, features: &DataTable, targets: &DataTable,
    options: &FitOptions,
) -> SurrogateResult<TrainedMultiTaskGp> {
    run_pipeline(ModelStructure::from(spec), features, targets, options, &mut |_| {})
}

/// Multi-task surrogate with an observable fitting lifecycle.
///
/// `fit` takes `&mut self`, so one surrogate is never fitted concurrently.
/// A failed fit leaves the surrogate in [`FitState::Failed`] without a
/// model; a later `fit` starts over.
#[derive(Debug, Clone)]
pub struct MultiTaskGpSurrogate {
    spec: MultiTaskGpSpecification,
    options: FitOptions,
    state: FitState,
    history: Vec<FitState>,
    model: Option<TrainedMultiTaskGp>,
}

impl MultiTaskGpSurrogate {
    pub fn new(spec: MultiTaskGpSpecification, options: FitOptions) -> Self {
        Self { spec, options, state: FitState::Unfit, history: Vec::new(), model: None }
    }

    pub fn spec(&self) -> &MultiTaskGpSpecification {
        &self.spec
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    /// States entered during the last `fit`, in order.
    pub fn history(&self) -> &[FitState] {
        &self.history
    }

    pub fn model(&self) -> Option<&TrainedMultiTaskGp> {
        self.model.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.state == FitState::Fit
    }

    /// Run the pipeline on training tables.
    ///
    /// # Errors
    /// See [`fit`]; the surrogate ends in [`FitState::Failed`].
    pub fn fit(&mut self, features: &DataTable, targets: &DataTable) -> SurrogateResult<()> {
        self.model = None;
        self.history.clear();
        let mut entered = Vec::new();
        let result = run_pipeline(
            ModelStructure::from(&self.spec),
            features,
            targets,
            &self.options,
            &mut |state| entered.push(state),
        );
        self.history = entered;
        match result {
            Ok(model) => {
                self.model = Some(model);
                self.enter(FitState::Fit);
                Ok(())
            }
            Err(err) => {
                self.enter(FitState::Failed);
                Err(err)
            }
        }
    }

    /// # Errors
    /// [`SurrogateError::NotFitted`] before a successful fit, otherwise see
    /// [`TrainedMultiTaskGp::predict`].
    pub fn predict(&self, features: &DataTable) -> SurrogateResult<Predictions> {
        self.model.as_ref().ok_or(SurrogateError::NotFitted)?.predict(features)
    }

    fn enter(&mut self, state: FitState) {
        debug!(?state, "surrogate state transition");
        self.history.push(state);
        self.state = state;
    }
}

fn run_pipeline(
    structure: ModelStructure<'_>, features: &DataTable, targets: &DataTable,
    options: &FitOptions, on_state: &mut dyn FnMut(FitState),
) -> SurrogateResult<TrainedMultiTaskGp> {
    let span = info_span!(
        "fit_multitask_gp",
        rows = features.n_rows(),
        outputs = structure.outputs.len(),
        tasks = structure.task.map(|(_, count, _)| count),
    );
    let _guard = span.enter();
    let mut enter = |state: FitState| {
        debug!(?state, "pipeline state transition");
        on_state(state);
    };

    // ---- Output filtering ----
    if features.n_rows() != targets.n_rows() {
        return Err(SurrogateError::RowCountMismatch {
            features: features.n_rows(),
            targets: targets.n_rows(),
        });
    }
    let output_columns = structure
        .outputs
        .keys()
        .iter()
        .map(|key| targets.numeric(key, |key| SurrogateError::MissingOutputColumn { key }))
        .collect::<SurrogateResult<Vec<&[f64]>>>()?;
    let keep: Vec<usize> = (0..targets.n_rows())
        .filter(|&row| output_columns.iter().all(|col| col[row].is_finite()))
        .collect();
    if keep.is_empty() {
        return Err(SurrogateError::EmptyTrainingData);
    }
    if keep.len() < targets.n_rows() {
        debug!(dropped = targets.n_rows() - keep.len(), "dropped rows with non-finite outputs");
    }
    let features = features.select_rows(&keep);
    let y = Array2::from_shape_fn((keep.len(), output_columns.len()), |(i, j)| {
        output_columns[j][keep[i]]
    });

    // ---- Transforming ----
    enter(FitState::Transforming);

    if let Some((key, _, _)) = structure.task {
        if features.column(key).is_none() {
            return Err(SurrogateError::MissingTaskColumn { key: key.to_string() });
        }
    }
    let encoded = structure.inputs.transform(&features, structure.specs)?;
    let task = match structure.task {
        Some((key, task_count, _)) => Some(TaskColumn {
            key: key.to_string(),
            index: encoded
                .position(key)
                .ok_or_else(|| SurrogateError::MissingTaskColumn { key: key.to_string() })?,
            task_count,
        }),
        None => None,
    };
    let (spatial, tasks) = split_task_column(encoded.matrix.view(), task.as_ref())?;

    // ---- ModelConstructed ----
    let input_transform = get_scaler(structure.inputs, structure.scaler, &encoded);
    let input_transform = match &task {
        Some(t) => input_transform.drop_column(t.index),
        None => input_transform,
    };
    let x = input_transform.apply(spatial.view());
    let outcome_transform = match structure.output_scaler {
        ScalerKind::Standardize => Some(OutcomeStandardize::fit(y.view())),
        ScalerKind::Identity => None,
        ScalerKind::Normalize => {
            return Err(SurrogateError::InvalidSpecification {
                field: "output_scaler",
                reason: "outputs support Standardize or Identity".to_string(),
            });
        }
    };
    let y = match &outcome_transform {
        Some(t) => t.transform(y.view()),
        None => y,
    };

    let dimensionality = x.ncols();
    let active_dims: Vec<usize> = (0..dimensionality).collect();
    let covar_module = build_kernel(structure.kernel, dimensionality, &active_dims)?;
    let task_covar_prior = match structure.task {
        Some((_, task_count, lkj)) if lkj.n_tasks() != task_count => {
            return Err(SurrogateError::TaskCountMismatch { expected: task_count, found: lkj.n_tasks() });
        }
        Some((_, _, lkj)) => Some(lkj.clone()),
        None => None,
    };
    let priors = GpPriors {
        noise: Some(map_prior(structure.noise_prior)?),
        lengthscale: covar_module.lengthscale_prior().map(map_prior).transpose()?,
        offset: covar_module.offset_prior().map(map_prior).transpose()?,
        task_covar: task_covar_prior.as_ref().map(map_lkj).transpose()?,
    };
    let gp = ExactGp::new(
        covar_module.clone(),
        task.as_ref().map(|t| t.task_count),
        priors,
        options.numeric.clone(),
    );
    enter(FitState::ModelConstructed);
    debug!(
        dimensionality,
        n_params = gp.n_params(),
        input_transform = ?input_transform.kind(),
        standardize_outputs = outcome_transform.is_some(),
        "model constructed"
    );

    // ---- Optimizing ----
    enter(FitState::Optimizing);
    let mut outcomes = Vec::with_capacity(structure.outputs.len());
    for (j, key) in structure.outputs.keys().iter().enumerate() {
        let data = GpTrainingData { x: x.clone(), tasks: tasks.clone(), y: y.column(j).to_owned() };
        let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(j as u64));
        let outcome = maximize_with_restarts(
            &gp,
            &data,
            &options.mle_opts,
            options.max_attempts,
            |attempt| if attempt == 0 { gp.initial_theta() } else { gp.sample_theta(&mut rng) },
        )?;
        let posterior = gp.posterior(&outcome.theta_hat, &data)?;
        info!(
            output = %key,
            loglik = outcome.value,
            attempts = outcome.attempts,
            iterations = outcome.iterations,
            "output fitted"
        );
        outcomes.push(OutputFit::new(key.clone(), posterior, outcome));
    }

    Ok(TrainedMultiTaskGp {
        inputs: structure.inputs.clone(),
        input_preprocessing_specs: structure.specs.clone(),
        task,
        input_transform,
        outcome_transform,
        covar_module,
        noise_prior: structure.noise_prior.clone(),
        task_covar_prior,
        outcomes,
    })
}
