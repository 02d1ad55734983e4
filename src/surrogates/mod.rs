//! surrogates — specifications, search space and fitting of GP surrogates.
//!
//! Purpose
//! -------
//! Everything above the numerical layers: training tables and feature
//! declarations ([`data`]), surrogate specifications with their
//! hyperparameter search space ([`models`]), and the fitting pipeline that
//! produces trained models ([`fit`]).
//!
//! Data flow
//! ---------
//! search-space point → [`apply_hyperparameters`](models::apply_hyperparameters)
//! → [`MultiTaskGpSpecification`](models::MultiTaskGpSpecification)
//! → [`fit`](fit::fit) → [`TrainedMultiTaskGp`](fit::TrainedMultiTaskGp).
//!
//! Errors
//! ------
//! [`SurrogateError`](errors::SurrogateError) groups configuration,
//! validation and optimization failures; kernel, prior and optimizer errors
//! convert into it.

pub mod data;
pub mod errors;
pub mod fit;
pub mod models;

pub mod prelude {
    pub use super::data::{Column, DataTable, InputFeature, Inputs, Outputs};
    pub use super::errors::{SurrogateError, SurrogateResult};
    pub use super::fit::{FitOptions, FitState, MultiTaskGpSurrogate, TrainedMultiTaskGp, fit};
    pub use super::models::{
        MultiTaskGpSpecification, SearchSpacePoint, apply_hyperparameters,
    };
}
