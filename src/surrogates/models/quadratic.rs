//! Single-task quadratic surrogate specification.
//!
//! A GP with a polynomial kernel of power 2 over every transformed input
//! column. It has no task feature and no search space; it is fitted by
//! [`fit_quadratic`](crate::surrogates::fit::fit_quadratic).
use serde::{Deserialize, Serialize};

use crate::{
    kernels::KernelChoice,
    priors::{Prior, botorch_noise_prior},
    surrogates::{
        data::{InputPreprocessingSpecs, Inputs, Outputs},
        errors::{SurrogateError, SurrogateResult},
        models::scaler::ScalerKind,
    },
};

const DEFAULT_POWER: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticSpecification {
    inputs: Inputs,
    outputs: Outputs,
    kernel: KernelChoice,
    noise_prior: Prior,
    scaler: ScalerKind,
    output_scaler: ScalerKind,
    input_preprocessing_specs: InputPreprocessingSpecs,
}

impl QuadraticSpecification {
    /// # Errors
    /// [`SurrogateError::InvalidSpecification`] if `inputs` declares a task
    /// feature.
    pub fn new(inputs: Inputs, outputs: Outputs) -> SurrogateResult<Self> {
        if inputs.task_features().next().is_some() {
            return Err(SurrogateError::InvalidSpecification {
                field: "inputs",
                reason: "the quadratic surrogate is single-task".to_string(),
            });
        }
        Ok(Self {
            inputs,
            outputs,
            kernel: KernelChoice::polynomial(DEFAULT_POWER)?,
            noise_prior: botorch_noise_prior(),
            scaler: ScalerKind::Normalize,
            output_scaler: ScalerKind::Standardize,
            input_preprocessing_specs: InputPreprocessingSpecs::new(),
        })
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn kernel(&self) -> &KernelChoice {
        &self.kernel
    }

    pub fn noise_prior(&self) -> &Prior {
        &self.noise_prior
    }

    pub fn scaler(&self) -> ScalerKind {
        self.scaler
    }

    pub fn output_scaler(&self) -> ScalerKind {
        self.output_scaler
    }

    pub fn input_preprocessing_specs(&self) -> &InputPreprocessingSpecs {
        &self.input_preprocessing_specs
    }

    /// Replace the polynomial power.
    ///
    /// # Errors
    /// Kernel validation error if `power == 0`.
    pub fn with_power(mut self, power: u32) -> SurrogateResult<Self> {
        self.kernel = KernelChoice::polynomial(power)?;
        Ok(self)
    }

    pub fn with_noise_prior(mut self, noise_prior: Prior) -> Self {
        self.noise_prior = noise_prior;
        self
    }

    pub fn with_scaler(mut self, scaler: ScalerKind) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn with_output_scaler(mut self, output_scaler: ScalerKind) -> Self {
        self.output_scaler = output_scaler;
        self
    }

    pub fn with_input_preprocessing_specs(mut self, specs: InputPreprocessingSpecs) -> Self {
        self.input_preprocessing_specs = specs;
        self
    }
}
