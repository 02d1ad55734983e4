//! Errors for kernel selection and covariance-module construction.
//!
//! All variants are configuration errors: they are raised while building a
//! covariance module, before any likelihood is evaluated, and are never
//! retried by the fitting pipeline.

/// Result alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    // ---- Selection ----
    /// Kernel tag is not one of the declared search-space values.
    #[error("Unknown kernel kind '{tag}'. Valid options are 'rbf', 'matern_1.5' or 'matern_2.5'.")]
    UnknownKernelKind { tag: String },

    /// Matern smoothness must be 1.5 or 2.5.
    #[error("Unsupported Matern smoothness nu = {nu}. Valid options are 1.5 or 2.5.")]
    UnsupportedMaternNu { nu: f64 },

    /// Polynomial power must lie in `[1, MAX_POLYNOMIAL_POWER]`.
    #[error("Invalid polynomial power {power}: {reason}")]
    InvalidPolynomialPower { power: u32, reason: &'static str },

    // ---- Active dimensions ----
    /// More active dimensions than input dimensions.
    #[error("Invalid active dims: {active} active dims for dimensionality {dimensionality}")]
    InvalidActiveDims { dimensionality: usize, active: usize },

    /// An active dimension is outside `[0, dimensionality)`.
    #[error("Active dim {dim} out of range for dimensionality {dimensionality}")]
    ActiveDimOutOfRange { dim: usize, dimensionality: usize },

    /// An active dimension is listed twice.
    #[error("Active dim {dim} listed more than once")]
    DuplicateActiveDim { dim: usize },

    /// A covariance module needs at least one active dimension.
    #[error("A covariance module needs at least one active dimension")]
    NoActiveDims,

    // ---- Evaluation ----
    /// Point sets do not match the module's dimensionality.
    #[error("Input dimension mismatch: expected {expected} columns, found {found}")]
    InputDimMismatch { expected: usize, found: usize },

    /// Hyperparameter slice does not match the module's parameter count.
    #[error("Kernel parameter length mismatch: expected {expected}, found {found}")]
    ParamLengthMismatch { expected: usize, found: usize },
}
