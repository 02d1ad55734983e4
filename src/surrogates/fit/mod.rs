//! fit — the multi-task fitting pipeline and its trained models.
//!
//! Purpose
//! -------
//! Turn training tables and a read-only specification into a trained GP
//! surrogate: input preprocessing, task-index handling, input/outcome
//! scaling, covariance construction and bounded-retry likelihood
//! maximization.
//!
//! Key behaviors
//! -------------
//! - [`fit`] / [`fit_quadratic`]: one-shot pipeline runs.
//! - [`MultiTaskGpSurrogate`]: the same pipeline with an observable
//!   [`FitState`] lifecycle.
//! - [`TrainedMultiTaskGp::predict`]: posterior mean and standard deviation
//!   on the original output scale.
//!
//! Invariants & assumptions
//! ------------------------
//! - The kernel acts on `X'` without the task column, active dims
//!   `[0 .. d-2]`, wherever the task column sits in `X'`.
//! - Outputs are fitted as independent GPs sharing one covariance
//!   structure.
//! - Restarts are seeded from `FitOptions::seed`, so fits are reproducible.
//!
//! Conventions
//! -----------
//! - Logging: one `info` span per fit, `debug` events for state
//!   transitions, `info` per fitted output.
//!
//! Testing notes
//! -------------
//! - Unit tests cover transforms, the GP likelihood, task-column handling
//!   and stage ordering; the integration test runs complete fits.

pub mod gp;
pub mod options;
pub mod pipeline;
pub mod trained;
pub mod transforms;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::gp::{ExactGp, GpHyperparameters, GpPosterior, GpPriors, GpTrainingData};
pub use self::options::{DEFAULT_MIN_NOISE, FitOptions, NumericConfig};
pub use self::pipeline::{FitState, MultiTaskGpSurrogate, fit, fit_quadratic};
pub use self::trained::{OutputFit, Predictions, TaskColumn, TrainedMultiTaskGp};
pub use self::transforms::{InputTransform, OutcomeStandardize, get_scaler};
