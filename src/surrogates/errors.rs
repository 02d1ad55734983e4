//! Error surface of the surrogate layer.
//!
//! Three groups, matching how the pipeline treats them:
//!
//! - **Configuration** errors (unknown tags, missing columns, bad task
//!   values, invalid active dims or prior parameters): fatal, raised before
//!   or during model construction, never retried. Messages name the
//!   offending field.
//! - **Validation** errors: malformed specifications rejected at
//!   construction time.
//! - **Optimization** errors: [`SurrogateError::FitFailed`] after the retry
//!   budget is exhausted, carrying the last optimizer failure.
//!
//! [`KernelError`], [`PriorError`] and [`OptError`] convert via `From`;
//! unknown-tag variants are lifted to their top-level counterparts.
use crate::{kernels::KernelError, optimization::errors::OptError, priors::PriorError};

/// Result alias for surrogate operations.
pub type SurrogateResult<T> = Result<T, SurrogateError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurrogateError {
    // ---- Configuration ----
    /// Kernel tag outside the declared search space.
    #[error("Unknown kernel kind '{tag}' for field 'kernel'")]
    UnknownKernelKind { tag: String },

    /// Prior tag outside the declared presets.
    #[error("Unknown prior kind '{tag}' for field 'prior'")]
    UnknownPriorKind { tag: String },

    /// Training features lack the task column.
    #[error("Task column '{key}' missing from training features")]
    MissingTaskColumn { key: String },

    /// A declared input feature has no column in the feature table.
    #[error("Input column '{key}' missing from training features")]
    MissingInputColumn { key: String },

    /// A declared output has no column in the target table.
    #[error("Output column '{key}' missing from training targets")]
    MissingOutputColumn { key: String },

    /// Task values must be integers in `[0, task_count)`.
    #[error("Invalid task value {value} in row {row} of '{key}': expected an integer in [0, {task_count})")]
    InvalidTaskValue { key: String, row: usize, value: f64, task_count: usize },

    /// Task-correlation prior sized for a different number of tasks.
    #[error("Task-correlation prior has n_tasks = {found}, specification has task_count = {expected}")]
    TaskCountMismatch { expected: usize, found: usize },

    /// A categorical value is not among the feature's categories.
    #[error("Unknown category '{value}' in row {row} of '{key}'")]
    UnknownCategory { key: String, row: usize, value: String },

    /// Column holds the wrong kind of values.
    #[error("Column '{key}' must be {expected}")]
    ColumnTypeMismatch { key: String, expected: &'static str },

    /// Columns of one table differ in length.
    #[error("Column '{key}' has {found} rows, expected {expected}")]
    ColumnLengthMismatch { key: String, expected: usize, found: usize },

    /// Feature and target tables differ in row count.
    #[error("Features have {features} rows but targets have {targets}")]
    RowCountMismatch { features: usize, targets: usize },

    /// Two features, outputs or columns share a key.
    #[error("Duplicate key '{key}'")]
    DuplicateKey { key: String },

    /// A search-space candidate has a missing or malformed field.
    #[error("Invalid hyperparameter '{key}' = '{value}'")]
    InvalidHyperparameter { key: String, value: String },

    /// Kernel construction or evaluation failed.
    #[error("Invalid kernel configuration: {0}")]
    Kernel(KernelError),

    /// Prior construction failed.
    #[error("Invalid prior configuration: {0}")]
    Prior(PriorError),

    // ---- Validation ----
    /// Multi-task surrogates need at least one task.
    #[error("Invalid task count {task_count}: must be at least 1")]
    InvalidTaskCount { task_count: usize },

    /// Inputs must declare the task feature named by the specification.
    #[error("Inputs do not declare a task feature named '{key}'")]
    MissingTaskFeature { key: String },

    /// Inputs, outputs or a feature declaration are malformed.
    #[error("Invalid specification field '{field}': {reason}")]
    InvalidSpecification { field: &'static str, reason: String },

    /// No usable training rows after output filtering.
    #[error("No training rows left after output filtering")]
    EmptyTrainingData,

    /// Metric inputs are empty or have different lengths.
    #[error("Invalid metric input: {reason}")]
    InvalidMetricInput { reason: &'static str },

    /// Prediction requested before a successful fit.
    #[error("Surrogate is not fitted")]
    NotFitted,

    // ---- Optimization ----
    /// Likelihood maximization failed on every attempt.
    #[error("Fit failed after {attempts} attempts: {last_error}")]
    FitFailed { attempts: usize, last_error: OptError },

    /// Non-retryable optimizer error (e.g. rejected starting point).
    #[error("Optimizer error: {0}")]
    Optimization(OptError),
}

impl From<KernelError> for SurrogateError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::UnknownKernelKind { tag } => SurrogateError::UnknownKernelKind { tag },
            other => SurrogateError::Kernel(other),
        }
    }
}

impl From<PriorError> for SurrogateError {
    fn from(err: PriorError) -> Self {
        match err {
            PriorError::UnknownPriorKind { tag } => SurrogateError::UnknownPriorKind { tag },
            other => SurrogateError::Prior(other),
        }
    }
}

impl From<OptError> for SurrogateError {
    /// Exhausted restarts become [`SurrogateError::FitFailed`]; anything else
    /// is a non-retryable [`SurrogateError::Optimization`].
    fn from(err: OptError) -> Self {
        match err {
            OptError::AttemptsExhausted { attempts, last_error } => {
                SurrogateError::FitFailed { attempts, last_error: *last_error }
            }
            other => SurrogateError::Optimization(other),
        }
    }
}
