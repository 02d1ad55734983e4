//! Multi-task GP surrogate specification.
//!
//! A [`MultiTaskGpSpecification`] is the validated description of a
//! multi-task surrogate's structure. It is built once from explicit default
//! constructors, rewritten by value (`with_*` methods or
//! [`apply_hyperparameters`](super::hyperconfig::apply_hyperparameters)) and
//! then handed read-only to the fitting pipeline.
//!
//! Invariant: `lkj_prior().n_tasks() == task_count()` at all times. Builder
//! methods resize the prior; deserialization rejects a mismatch.
use serde::{Deserialize, Serialize};

use crate::{
    kernels::KernelChoice,
    priors::{LkjPrior, Prior, botorch_lkj_prior, botorch_noise_prior},
    surrogates::{
        data::{InputPreprocessingSpecs, Inputs, Outputs},
        errors::{SurrogateError, SurrogateResult},
        models::{hyperconfig::MultiTaskGpHyperconfig, scaler::ScalerKind},
    },
};

/// Key of the task column when none is configured.
pub const DEFAULT_TASK_FEATURE_KEY: &str = "fid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpecificationFields")]
pub struct MultiTaskGpSpecification {
    inputs: Inputs,
    outputs: Outputs,
    task_count: usize,
    task_feature_key: String,
    kernel: KernelChoice,
    noise_prior: Prior,
    lkj_prior: LkjPrior,
    scaler: ScalerKind,
    output_scaler: ScalerKind,
    input_preprocessing_specs: InputPreprocessingSpecs,
    hyperconfig: Option<MultiTaskGpHyperconfig>,
}

impl MultiTaskGpSpecification {
    /// Specification with default structure: Matern 2.5 ARD kernel with the
    /// botorch lengthscale prior, botorch noise prior, LKJ task prior over
    /// `task_count` tasks, `Normalize` inputs, `Standardize` outputs and the
    /// default search space.
    ///
    /// # Errors
    /// - [`SurrogateError::InvalidTaskCount`] if `task_count == 0`.
    /// - [`SurrogateError::MissingTaskFeature`] if `inputs` has no task
    ///   feature; [`SurrogateError::InvalidSpecification`] if it has more
    ///   than one.
    pub fn new(inputs: Inputs, outputs: Outputs, task_count: usize) -> SurrogateResult<Self> {
        verify_task_count(task_count)?;
        let task_feature_key = locate_task_feature(&inputs)?;
        Ok(Self {
            inputs,
            outputs,
            task_count,
            task_feature_key,
            kernel: KernelChoice::default_multitask(),
            noise_prior: botorch_noise_prior(),
            lkj_prior: botorch_lkj_prior(task_count)?,
            scaler: ScalerKind::Normalize,
            output_scaler: ScalerKind::Standardize,
            input_preprocessing_specs: InputPreprocessingSpecs::new(),
            hyperconfig: Some(MultiTaskGpHyperconfig::default()),
        })
    }

    // ---- Accessors ----

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn task_feature_key(&self) -> &str {
        &self.task_feature_key
    }

    pub fn kernel(&self) -> &KernelChoice {
        &self.kernel
    }

    pub fn noise_prior(&self) -> &Prior {
        &self.noise_prior
    }

    pub fn lkj_prior(&self) -> &LkjPrior {
        &self.lkj_prior
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

    pub fn hyperconfig(&self) -> Option<&MultiTaskGpHyperconfig> {
        self.hyperconfig.as_ref()
    }

    // ---- By-value updates ----

    /// Change the task count and resize the task-correlation prior with it.
    ///
    /// # Errors
    /// [`SurrogateError::InvalidTaskCount`] if `task_count == 0`.
    pub fn with_task_count(mut self, task_count: usize) -> SurrogateResult<Self> {
        verify_task_count(task_count)?;
        self.lkj_prior = self.lkj_prior.with_n_tasks(task_count)?;
        self.task_count = task_count;
        Ok(self)
    }

    /// Replace the task-correlation prior, resized to the current task count.
    ///
    /// # Errors
    /// Propagates LKJ validation errors.
    pub fn with_lkj_prior(mut self, lkj_prior: LkjPrior) -> SurrogateResult<Self> {
        self.lkj_prior = lkj_prior.with_n_tasks(self.task_count)?;
        Ok(self)
    }

    pub fn with_kernel(mut self, kernel: KernelChoice) -> Self {
        self.kernel = kernel;
        self
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

    pub fn with_hyperconfig(mut self, hyperconfig: Option<MultiTaskGpHyperconfig>) -> Self {
        self.hyperconfig = hyperconfig;
        self
    }
}

fn verify_task_count(task_count: usize) -> SurrogateResult<()> {
    if task_count == 0 {
        return Err(SurrogateError::InvalidTaskCount { task_count });
    }
    Ok(())
}

fn locate_task_feature(inputs: &Inputs) -> SurrogateResult<String> {
    let mut tasks = inputs.task_features();
    let first = tasks.next().ok_or_else(|| SurrogateError::MissingTaskFeature {
        key: DEFAULT_TASK_FEATURE_KEY.to_string(),
    })?;
    if tasks.next().is_some() {
        return Err(SurrogateError::InvalidSpecification {
            field: "inputs",
            reason: "a multi-task surrogate takes exactly one task feature".to_string(),
        });
    }
    Ok(first.key().to_string())
}

/// Serialized form; converted through the same validation as the builders.
#[derive(Deserialize)]
struct SpecificationFields {
    inputs: Inputs,
    outputs: Outputs,
    task_count: usize,
    #[serde(default)]
    task_feature_key: Option<String>,
    #[serde(default = "KernelChoice::default_multitask")]
    kernel: KernelChoice,
    #[serde(default = "botorch_noise_prior")]
    noise_prior: Prior,
    #[serde(default)]
    lkj_prior: Option<LkjPrior>,
    #[serde(default = "default_scaler")]
    scaler: ScalerKind,
    #[serde(default = "default_output_scaler")]
    output_scaler: ScalerKind,
    #[serde(default)]
    input_preprocessing_specs: InputPreprocessingSpecs,
    #[serde(default = "default_hyperconfig")]
    hyperconfig: Option<MultiTaskGpHyperconfig>,
}

fn default_scaler() -> ScalerKind {
    ScalerKind::Normalize
}

fn default_output_scaler() -> ScalerKind {
    ScalerKind::Standardize
}

fn default_hyperconfig() -> Option<MultiTaskGpHyperconfig> {
    Some(MultiTaskGpHyperconfig::default())
}

impl TryFrom<SpecificationFields> for MultiTaskGpSpecification {
    type Error = SurrogateError;

    fn try_from(fields: SpecificationFields) -> Result<Self, Self::Error> {
        let spec = MultiTaskGpSpecification::new(fields.inputs, fields.outputs, fields.task_count)?;
        if let Some(key) = fields.task_feature_key {
            if key != spec.task_feature_key {
                return Err(SurrogateError::MissingTaskFeature { key });
            }
        }
        let spec = match fields.lkj_prior {
            Some(lkj) if lkj.n_tasks() != spec.task_count => {
                return Err(SurrogateError::TaskCountMismatch {
                    expected: spec.task_count,
                    found: lkj.n_tasks(),
                });
            }
            Some(lkj) => spec.with_lkj_prior(lkj)?,
            None => spec,
        };
        Ok(spec
            .with_kernel(fields.kernel)
            .with_noise_prior(fields.noise_prior)
            .with_scaler(fields.scaler)
            .with_output_scaler(fields.output_scaler)
            .with_input_preprocessing_specs(fields.input_preprocessing_specs)
            .with_hyperconfig(fields.hyperconfig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kernels::MaternNu, surrogates::data::InputFeature};
    use proptest::prelude::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Defaults, task-count validation, LKJ synchronization (builders,
    // property test, deserialization) and the task-feature requirement.
    // -------------------------------------------------------------------------

    pub(crate) fn inputs() -> Inputs {
        Inputs::new(vec![
            InputFeature::continuous("x1", 0.0, 1.0),
            InputFeature::task("fid"),
            InputFeature::continuous("x2", 0.0, 1.0),
        ])
        .expect("valid inputs")
    }

    fn outputs() -> Outputs {
        Outputs::new(vec!["y"]).expect("valid outputs")
    }

    #[test]
    // Purpose
    // -------
    // Defaults match the documented structure.
    fn defaults_match_documented_structure() {
        let spec = MultiTaskGpSpecification::new(inputs(), outputs(), 2).expect("valid spec");

        assert_eq!(spec.task_feature_key(), "fid");
        assert!(matches!(
            spec.kernel(),
            KernelChoice::Matern { nu: MaternNu::TwoAndHalf, ard: true, .. }
        ));
        assert_eq!(spec.noise_prior(), &botorch_noise_prior());
        assert_eq!(spec.lkj_prior().n_tasks(), 2);
        assert_eq!(spec.lkj_prior().eta(), 2.0);
        assert_eq!(spec.scaler(), ScalerKind::Normalize);
        assert_eq!(spec.output_scaler(), ScalerKind::Standardize);
        assert!(spec.hyperconfig().is_some());
    }

    #[test]
    // Purpose
    // -------
    // Zero tasks and inputs without a task feature are validation errors.
    fn construction_validates_tasks() {
        let no_task = Inputs::new(vec![InputFeature::continuous("x1", 0.0, 1.0)]).expect("inputs");

        assert_eq!(
            MultiTaskGpSpecification::new(inputs(), outputs(), 0),
            Err(SurrogateError::InvalidTaskCount { task_count: 0 })
        );
        assert_eq!(
            MultiTaskGpSpecification::new(no_task, outputs(), 2),
            Err(SurrogateError::MissingTaskFeature { key: "fid".into() })
        );
    }

    proptest! {
        #[test]
        // Purpose
        // -------
        // For any task count the LKJ prior's task count stays in sync, after
        // construction, after `with_task_count` and after replacing the prior.
        fn lkj_task_count_never_stale(n in 1usize..16, m in 1usize..16) {
            let spec = MultiTaskGpSpecification::new(inputs(), outputs(), n).expect("valid spec");
            prop_assert_eq!(spec.lkj_prior().n_tasks(), n);

            let resized = spec.with_task_count(m).expect("valid count");
            prop_assert_eq!(resized.lkj_prior().n_tasks(), m);

            let other = botorch_lkj_prior(n + 3).expect("valid prior");
            let replaced = resized.with_lkj_prior(other).expect("valid prior");
            prop_assert_eq!(replaced.lkj_prior().n_tasks(), m);
        }
    }

    #[test]
    // Purpose
    // -------
    // Serde round trip preserves the specification; a stale LKJ task count
    // in serialized data is rejected.
    fn serde_round_trip_and_mismatch() {
        let spec = MultiTaskGpSpecification::new(inputs(), outputs(), 3).expect("valid spec");

        let json = serde_json::to_string(&spec).expect("serialize");
        let back: MultiTaskGpSpecification = serde_json::from_str(&json).expect("deserialize");
        let stale = json.replace("\"n_tasks\":3", "\"n_tasks\":5");
        let err = serde_json::from_str::<MultiTaskGpSpecification>(&stale).expect_err("stale");

        assert_eq!(back, spec);
        assert!(err.to_string().contains("n_tasks = 5"));
    }
}
