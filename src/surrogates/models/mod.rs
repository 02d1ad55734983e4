//! models — surrogate specifications and their search space.
//!
//! - [`multi_task`]: [`MultiTaskGpSpecification`], the validated structure of
//!   a multi-task GP surrogate.
//! - [`hyperconfig`]: the categorical search space and
//!   [`apply_hyperparameters`], the update rule from a point of that space
//!   to a rewritten specification.
//! - [`quadratic`]: [`QuadraticSpecification`], a single-task polynomial GP.
//! - [`scaler`], [`metrics`]: scaling policies and regression metrics
//!   referenced by the specifications.

pub mod hyperconfig;
pub mod metrics;
pub mod multi_task;
pub mod quadratic;
pub mod scaler;

pub use self::hyperconfig::{
    HyperStrategy, MultiTaskGpHyperconfig, SearchSpacePoint, apply_hyperparameters,
};
pub use self::metrics::RegressionMetric;
pub use self::multi_task::{DEFAULT_TASK_FEATURE_KEY, MultiTaskGpSpecification};
pub use self::quadratic::QuadraticSpecification;
pub use self::scaler::ScalerKind;
