//! Error surface for the likelihood-maximization layer.
//!
//! Every failure that can happen while configuring or running the optimizer
//! (bad tolerances, non-finite costs, argmin backend errors, numerically
//! singular covariance factorizations, exhausted restarts) is normalized into
//! [`OptError`]. Argmin's own error type never crosses this module boundary.
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    #[error("Gradient optimization not implemented")]
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    #[error("Gradient dimension mismatch: expected {expected}, found {found}")]
    GradientDimMismatch { expected: usize, found: usize },

    /// Gradient elements need to be finite
    #[error("Invalid gradient at index {index}: {value}: {reason}")]
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    #[error("Invalid gradient tolerance {tol}: {reason}")]
    InvalidTolGrad { tol: f64, reason: &'static str },

    /// Cost change tolerance needs to be positive and finite.
    #[error("Invalid cost function change tolerance {tol}: {reason}")]
    InvalidTolCost { tol: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    #[error("Invalid maximum iterations {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    /// At least one tolerance must be provided.
    #[error("No tolerances provided")]
    NoTolerancesProvided,

    /// Invalid line searcher name.
    #[error("Invalid line searcher '{name}': {reason}")]
    InvalidLineSearch { name: String, reason: &'static str },

    /// lbfgs_mem needs to be at least 1.
    #[error("Invalid L-BFGS memory {mem}: {reason}")]
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    /// Restart budget needs to be at least 1.
    #[error("Invalid maximum attempts {max_attempts}: {reason}")]
    InvalidMaxAttempts { max_attempts: usize, reason: &'static str },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    #[error("Non-finite cost value: {value}")]
    NonFiniteCost { value: f64 },

    /// Covariance matrix could not be factorized even after adding jitter.
    #[error("Covariance matrix of size {size} is not positive definite (max jitter {jitter:e})")]
    NotPositiveDefinite { size: usize, jitter: f64 },

    /// The model could not be evaluated on the supplied data.
    #[error("Model evaluation failed: {text}")]
    ModelEvaluation { text: String },

    // ---- Parameter vector ----
    /// Theta length does not match the model's parameter layout.
    #[error("Theta length mismatch: expected {expected}, actual {actual}")]
    ThetaLengthMismatch { expected: usize, actual: usize },

    /// Unconstrained optimization input must have finite values.
    #[error("Invalid theta input at index {index}: {value}, must be finite")]
    InvalidThetaInput { index: usize, value: f64 },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    #[error("Invalid estimated parameter at index {index}: {value}: {reason}")]
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    /// Theta hat is missing
    #[error("Missing estimated parameters (theta hat)")]
    MissingThetaHat,

    /// The solver stopped without meeting a convergence criterion (e.g. the
    /// iteration cap was reached).
    #[error("Optimizer did not converge after {iterations} iterations: {status}")]
    NotConverged { status: String, iterations: usize },

    /// Every optimization attempt failed; carries the last failure.
    #[error("All {attempts} optimization attempts failed; last error: {last_error}")]
    AttemptsExhausted { attempts: usize, last_error: Box<OptError> },

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    #[error("Invalid parameter: {text}")]
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    #[error("Not implemented: {text}")]
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    #[error("Not initialized: {text}")]
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    #[error("Condition violated: {text}")]
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    #[error("Checkpoint not found: {text}")]
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    #[error("Potential bug: {text}")]
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    #[error("Impossible error: {text}")]
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    #[error("Backend error: {text}")]
    BackendError { text: String },

    // ---- Fallback ----
    #[error("Unknown error")]
    UnknownError,
}

impl From<Error> for OptError {
    /// Normalize an argmin error.
    ///
    /// Errors raised by our own cost/gradient code travel through argmin as
    /// boxed `OptError`s and are recovered unchanged; argmin's own variants
    /// map one-to-one; anything else is kept as text.
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}
