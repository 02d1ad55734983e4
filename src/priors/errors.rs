//! Errors for prior selection and runtime prior construction.
use statrs::distribution::GammaError;

/// Result alias for prior operations.
pub type PriorResult<T> = Result<T, PriorError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriorError {
    // ---- Selection ----
    /// Prior tag is not one of the declared presets.
    #[error("Unknown prior kind '{tag}'. Valid options are 'mbo' or 'botorch'.")]
    UnknownPriorKind { tag: String },

    // ---- Parameters ----
    /// Gamma parameters must be finite and > 0.
    #[error("Invalid Gamma prior {param} = {value}: {reason}")]
    InvalidGammaParam { param: &'static str, value: f64, reason: &'static str },

    /// LKJ concentration must be finite and > 0.
    #[error("Invalid LKJ concentration eta = {eta}: must be finite and > 0")]
    InvalidLkjEta { eta: f64 },

    /// LKJ prior needs at least one task.
    #[error("Invalid LKJ task count {n_tasks}: must be at least 1")]
    InvalidLkjTaskCount { n_tasks: usize },

    // ---- Evaluation ----
    /// Covariance passed to the LKJ prior has the wrong size.
    #[error("LKJ covariance dimension mismatch: expected {expected}x{expected}, found {rows}x{cols}")]
    CovarianceDimMismatch { expected: usize, rows: usize, cols: usize },

    /// Wrapper for statrs::distribution::GammaError
    #[error("Invalid Gamma distribution: {text}")]
    GammaBackend { text: String },
}

impl From<GammaError> for PriorError {
    fn from(err: GammaError) -> Self {
        PriorError::GammaBackend { text: err.to_string() }
    }
}
