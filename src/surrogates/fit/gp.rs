//! Exact GP marginal likelihood with an optional intrinsic-coregionalization
//! task kernel.
//!
//! Covariance of two training rows:
//!
//! `K[i, j] = k(x_i, x_j) · B[t_i, t_j] + σ² δ_ij`
//!
//! with `B = W Wᵀ + diag(v)` over `T` tasks. Single-task models use
//! `B = s`, a positive output scale.
//!
//! θ layout (unconstrained, positive quantities through softplus):
//!
//! | slot              | length           | decoded as                         |
//! |-------------------|------------------|------------------------------------|
//! | constant mean `c` | 1                | identity                           |
//! | noise             | 1                | `σ² = min_noise + softplus(θ)`     |
//! | kernel            | `num_params()`   | softplus (lengthscales or offset)  |
//! | output scale `s`  | 1 (single-task)  | softplus                           |
//! | task `W`          | `T·T` (row-major)| identity (multi-task)              |
//! | task `v`          | `T`              | softplus (multi-task)              |
//!
//! The objective maximized is `(log p(y | θ) + Σ log priors) / n`.
use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;

use crate::{
    kernels::CovarianceModule,
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, LogLikelihood, Theta, validation::validate_theta_input},
        numerical_stability::{chol_log_det, cholesky_with_jitter, safe_softplus, safe_softplus_inv, to_dmatrix},
    },
    priors::{GammaPrior, LkjCovariancePrior},
    surrogates::fit::options::NumericConfig,
};

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// Starting values used when a parameter has no prior.
const DEFAULT_NOISE: f64 = 0.1;
const DEFAULT_LENGTHSCALE: f64 = 1.0;
const DEFAULT_OFFSET: f64 = 1.0;
const DEFAULT_OUTPUTSCALE: f64 = 1.0;

/// Training data seen by the likelihood: scaled spatial inputs, task index
/// per row (multi-task models only) and one standardized output column.
#[derive(Debug, Clone, PartialEq)]
pub struct GpTrainingData {
    pub x: Array2<f64>,
    pub tasks: Option<Vec<usize>>,
    pub y: Array1<f64>,
}

/// Priors attached to the model's parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GpPriors {
    pub noise: Option<GammaPrior>,
    pub lengthscale: Option<GammaPrior>,
    pub offset: Option<GammaPrior>,
    pub task_covar: Option<LkjCovariancePrior>,
}

/// Decoded (constrained) hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GpHyperparameters {
    pub mean: f64,
    pub noise: f64,
    pub kernel_params: Vec<f64>,
    /// Output scale of a single-task model.
    pub outputscale: Option<f64>,
    pub task_covar: Option<Array2<f64>>,
}

/// Exact GP over a fixed covariance module.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactGp {
    covar: CovarianceModule,
    n_tasks: Option<usize>,
    priors: GpPriors,
    numeric: NumericConfig,
}

impl ExactGp {
    /// `n_tasks = None` builds a single-task model.
    pub fn new(
        covar: CovarianceModule, n_tasks: Option<usize>, priors: GpPriors, numeric: NumericConfig,
    ) -> Self {
        Self { covar, n_tasks, priors, numeric }
    }

    pub fn covar(&self) -> &CovarianceModule {
        &self.covar
    }

    pub fn n_tasks(&self) -> Option<usize> {
        self.n_tasks
    }

    pub fn priors(&self) -> &GpPriors {
        &self.priors
    }

    /// Slots after the kernel parameters: the output scale, or `W` and `v`.
    fn scale_params(&self) -> usize {
        self.n_tasks.map_or(1, |t| t * t + t)
    }

    /// Length of θ.
    pub fn n_params(&self) -> usize {
        2 + self.covar.num_params() + self.scale_params()
    }

    /// Map θ to constrained hyperparameters.
    ///
    /// # Errors
    /// [`OptError::ThetaLengthMismatch`] on a wrong length.
    pub fn decode(&self, theta: &Theta) -> OptResult<GpHyperparameters> {
        if theta.len() != self.n_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.n_params(),
                actual: theta.len(),
            });
        }
        let k = self.covar.num_params();
        let kernel_params = (0..k).map(|i| safe_softplus(theta[2 + i])).collect();
        let outputscale = self.n_tasks.is_none().then(|| safe_softplus(theta[2 + k]));
        let task_covar = self.n_tasks.map(|t| {
            let offset = 2 + k;
            let w = Array2::from_shape_fn((t, t), |(i, j)| theta[offset + i * t + j]);
            let mut b = w.dot(&w.t());
            for i in 0..t {
                b[[i, i]] += safe_softplus(theta[offset + t * t + i]);
            }
            b
        });
        Ok(GpHyperparameters {
            mean: theta[0],
            noise: self.numeric.min_noise + safe_softplus(theta[1]),
            kernel_params,
            outputscale,
            task_covar,
        })
    }

    /// Deterministic first starting point: prior modes where a prior exists,
    /// fixed defaults otherwise. Task covariance starts at `B = 11ᵀ + I`,
    /// the single-task output scale at 1.
    pub fn initial_theta(&self) -> Theta {
        let noise = self.priors.noise.as_ref().map_or(DEFAULT_NOISE, GammaPrior::mode);
        let lengthscale =
            self.priors.lengthscale.as_ref().map_or(DEFAULT_LENGTHSCALE, GammaPrior::mode);
        let offset = self.priors.offset.as_ref().map_or(DEFAULT_OFFSET, GammaPrior::mode);
        self.encode(noise, |_| lengthscale, offset, |t| (1.0 / (t as f64).sqrt(), 1.0))
    }

    /// Random starting point: positive parameters drawn from their priors,
    /// task factors uniform on `[-1, 1]` and task variances from the squared
    /// standard-deviation prior. Parameters without a prior (the output
    /// scale included) keep their initial value.
    pub fn sample_theta<R: Rng>(&self, rng: &mut R) -> Theta {
        let noise = match &self.priors.noise {
            Some(p) => p.sample(rng),
            None => DEFAULT_NOISE,
        };
        let n_ls = self.covar.num_lengthscales();
        let lengthscales: Vec<f64> = (0..n_ls)
            .map(|_| match &self.priors.lengthscale {
                Some(p) => p.sample(rng),
                None => DEFAULT_LENGTHSCALE,
            })
            .collect();
        let offset = match &self.priors.offset {
            Some(p) => p.sample(rng),
            None => DEFAULT_OFFSET,
        };
        let t = self.n_tasks.unwrap_or(0);
        let w: Vec<f64> = (0..t * t).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        let v: Vec<f64> = (0..t)
            .map(|_| match &self.priors.task_covar {
                Some(p) => p.sd_prior().sample(rng).powi(2),
                None => 1.0,
            })
            .collect();

        let mut theta = self.encode(noise, |i| lengthscales[i], offset, |_| (0.0, 1.0));
        let base = 2 + self.covar.num_params();
        for (i, w) in w.into_iter().enumerate() {
            theta[base + i] = w;
        }
        for (i, v) in v.into_iter().enumerate() {
            theta[base + t * t + i] = safe_softplus_inv(v);
        }
        theta
    }

    /// θ from constrained values. `task(t)` gives the (constant) `W` entry
    /// and task variance used for every task.
    fn encode(
        &self, noise: f64, lengthscale: impl Fn(usize) -> f64, offset: f64,
        task: impl Fn(usize) -> (f64, f64),
    ) -> Theta {
        let mut theta = Array1::zeros(self.n_params());
        theta[1] = safe_softplus_inv(noise - self.numeric.min_noise);
        let n_ls = self.covar.num_lengthscales();
        if n_ls == 0 {
            theta[2] = safe_softplus_inv(offset);
        }
        for i in 0..n_ls {
            theta[2 + i] = safe_softplus_inv(lengthscale(i));
        }
        let base = 2 + self.covar.num_params();
        if let Some(t) = self.n_tasks {
            let (w, v) = task(t);
            for i in 0..t * t {
                theta[base + i] = w;
            }
            for i in 0..t {
                theta[base + t * t + i] = safe_softplus_inv(v);
            }
        } else {
            theta[base] = safe_softplus_inv(DEFAULT_OUTPUTSCALE);
        }
        theta
    }

    /// Full training covariance `K + σ² I` for decoded hyperparameters.
    fn train_covariance(&self, hp: &GpHyperparameters, data: &GpTrainingData) -> OptResult<Array2<f64>> {
        let mut k = self.cross_covariance(hp, data.x.view(), data.tasks.as_deref(), data)?;
        for i in 0..k.nrows() {
            k[[i, i]] += hp.noise;
        }
        Ok(k)
    }

    /// `k(x, X_train) ∘ B[t, t_train]`, or `s · k(x, X_train)` for a single
    /// task.
    fn cross_covariance(
        &self, hp: &GpHyperparameters, x: ArrayView2<f64>, tasks: Option<&[usize]>,
        data: &GpTrainingData,
    ) -> OptResult<Array2<f64>> {
        let mut k = self
            .covar
            .evaluate(x, data.x.view(), &hp.kernel_params)
            .map_err(|e| OptError::ModelEvaluation { text: e.to_string() })?;
        if let Some(s) = hp.outputscale {
            k.mapv_inplace(|v| v * s);
        }
        if let (Some(b), Some(rows), Some(cols)) = (&hp.task_covar, tasks, data.tasks.as_deref()) {
            for (i, &ti) in rows.iter().enumerate() {
                for (j, &tj) in cols.iter().enumerate() {
                    k[[i, j]] *= b[[ti, tj]];
                }
            }
        }
        Ok(k)
    }

    fn log_prior(&self, hp: &GpHyperparameters) -> OptResult<f64> {
        let mut lp = 0.0;
        if let Some(p) = &self.priors.noise {
            lp += p.ln_pdf(hp.noise);
        }
        let n_ls = self.covar.num_lengthscales();
        if let Some(p) = &self.priors.lengthscale {
            lp += hp.kernel_params[..n_ls].iter().map(|&l| p.ln_pdf(l)).sum::<f64>();
        }
        if let (Some(p), 0) = (&self.priors.offset, n_ls) {
            lp += p.ln_pdf(hp.kernel_params[0]);
        }
        if let (Some(p), Some(b)) = (&self.priors.task_covar, &hp.task_covar) {
            lp += p.ln_pdf(b.view()).map_err(|e| OptError::ModelEvaluation { text: e.to_string() })?;
        }
        Ok(lp)
    }

    /// Factorize the training covariance at θ and solve for the weights used
    /// by prediction.
    ///
    /// # Errors
    /// Same failures as [`LogLikelihood::value`].
    pub fn posterior(&self, theta: &Theta, data: &GpTrainingData) -> OptResult<GpPosterior> {
        let hp = self.decode(theta)?;
        let (chol, residual) = self.factorize(&hp, data)?;
        let alpha = chol.solve(&residual);
        Ok(GpPosterior { gp: self.clone(), hp, train: data.clone(), chol, alpha })
    }

    fn factorize(
        &self, hp: &GpHyperparameters, data: &GpTrainingData,
    ) -> OptResult<(Cholesky<f64, Dyn>, DVector<f64>)> {
        let k = self.train_covariance(hp, data)?;
        let (chol, _jitter) = cholesky_with_jitter(to_dmatrix(k.view()), &self.numeric.jitter_ladder)?;
        let residual = DVector::from_iterator(data.y.len(), data.y.iter().map(|y| y - hp.mean));
        Ok((chol, residual))
    }
}

impl LogLikelihood for ExactGp {
    type Data = GpTrainingData;

    /// `(log p(y | θ) + log p(θ)) / n`.
    ///
    /// # Errors
    /// - [`OptError::NotPositiveDefinite`] if `K + σ² I` cannot be
    ///   factorized with the configured jitter ladder.
    /// - [`OptError::ModelEvaluation`] for kernel or prior evaluation
    ///   failures.
    fn value(&self, theta: &Theta, data: &GpTrainingData) -> OptResult<Cost> {
        let hp = self.decode(theta)?;
        let (chol, residual) = self.factorize(&hp, data)?;
        let alpha = chol.solve(&residual);
        let n = data.y.len() as f64;
        let mll = -0.5 * residual.dot(&alpha) - 0.5 * chol_log_det(&chol) - 0.5 * n * LN_2PI;
        Ok((mll + self.log_prior(&hp)?) / n)
    }

    /// θ must have the model's length and finite entries; the data must be
    /// consistent with the covariance module and task count.
    fn check(&self, theta: &Theta, data: &GpTrainingData) -> OptResult<()> {
        validate_theta_input(theta, self.n_params())?;
        let n = data.y.len();
        if n == 0 || data.x.nrows() != n {
            return Err(OptError::ModelEvaluation {
                text: format!("{} input rows for {} observations", data.x.nrows(), n),
            });
        }
        if data.x.ncols() != self.covar.dimensionality() {
            return Err(OptError::ModelEvaluation {
                text: format!(
                    "inputs have {} columns, kernel expects {}",
                    data.x.ncols(),
                    self.covar.dimensionality()
                ),
            });
        }
        match (self.n_tasks, &data.tasks) {
            (None, None) => Ok(()),
            (Some(t), Some(tasks)) if tasks.len() == n && tasks.iter().all(|&k| k < t) => Ok(()),
            _ => Err(OptError::ModelEvaluation {
                text: "task indices do not match the task kernel".to_string(),
            }),
        }
    }
}

/// Fitted GP: frozen hyperparameters, training data and Cholesky factor.
#[derive(Debug, Clone)]
pub struct GpPosterior {
    gp: ExactGp,
    hp: GpHyperparameters,
    train: GpTrainingData,
    chol: Cholesky<f64, Dyn>,
    alpha: DVector<f64>,
}

impl GpPosterior {
    pub fn hyperparameters(&self) -> &GpHyperparameters {
        &self.hp
    }

    pub fn model(&self) -> &ExactGp {
        &self.gp
    }

    /// Latent posterior mean and variance at `x` (already scaled like the
    /// training inputs), in the standardized output space.
    ///
    /// # Errors
    /// [`OptError::ModelEvaluation`] if `x` has the wrong width or `tasks`
    /// is missing / out of range for a multi-task model.
    pub fn predict(
        &self, x: ArrayView2<f64>, tasks: Option<&[usize]>,
    ) -> OptResult<(Array1<f64>, Array1<f64>)> {
        if let Some(t) = self.gp.n_tasks {
            match tasks {
                Some(ts) if ts.len() == x.nrows() && ts.iter().all(|&k| k < t) => {}
                _ => {
                    return Err(OptError::ModelEvaluation {
                        text: "prediction rows need task indices in range".to_string(),
                    });
                }
            }
        }
        let ks = self.gp.cross_covariance(&self.hp, x, tasks, &self.train)?;
        let mut kdiag = self
            .gp
            .covar
            .evaluate_diag(x, &self.hp.kernel_params)
            .map_err(|e| OptError::ModelEvaluation { text: e.to_string() })?;
        if let Some(s) = self.hp.outputscale {
            kdiag.mapv_inplace(|v| v * s);
        }
        if let (Some(b), Some(ts)) = (&self.hp.task_covar, tasks) {
            for (v, &t) in kdiag.iter_mut().zip(ts) {
                *v *= b[[t, t]];
            }
        }

        let ks_t: DMatrix<f64> = to_dmatrix(ks.t());
        let solved = self.chol.solve(&ks_t);
        let mean = Array1::from_iter(
            (0..x.nrows()).map(|i| self.hp.mean + ks_t.column(i).dot(&self.alpha)),
        );
        let var = Array1::from_iter(
            (0..x.nrows()).map(|i| (kdiag[i] - ks_t.column(i).dot(&solved.column(i))).max(0.0)),
        );
        Ok((mean, var))
    }
}
