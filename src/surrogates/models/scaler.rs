//! Scaling policies shared by surrogate specifications.
//!
//! Inputs accept all three policies; outputs accept `Standardize` or
//! `Identity` (the fitting pipeline rejects `Normalize` for outputs).
use serde::{Deserialize, Serialize};

/// Scaling policy for inputs or outputs.
///
/// - `Normalize`: map continuous inputs to `[0, 1]` using bounds widened by
///   the training data range.
/// - `Standardize`: zero mean, unit (unbiased) standard deviation.
/// - `Identity`: no transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerKind {
    Normalize,
    Standardize,
    Identity,
}
