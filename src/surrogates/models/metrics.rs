//! Regression metrics used to score surrogate predictions.
//!
//! The hyperparameter search space names one of these as its target metric;
//! [`TrainedMultiTaskGp::score`](crate::surrogates::fit::TrainedMultiTaskGp::score)
//! evaluates it on held-out data.
use serde::{Deserialize, Serialize};

use crate::surrogates::errors::{SurrogateError, SurrogateResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegressionMetric {
    /// Mean absolute error.
    #[default]
    Mae,
    /// Mean squared deviation.
    Msd,
    /// Coefficient of determination.
    R2,
    /// Mean absolute percentage error (observations equal to zero are skipped).
    Mape,
    /// Pearson correlation coefficient.
    Pearson,
}

impl RegressionMetric {
    /// Whether larger values are better (`R2`, `Pearson`).
    pub fn maximize(self) -> bool {
        matches!(self, RegressionMetric::R2 | RegressionMetric::Pearson)
    }

    /// # Errors
    /// [`SurrogateError::InvalidMetricInput`] for empty or ragged inputs.
    pub fn evaluate(self, observed: &[f64], predicted: &[f64]) -> SurrogateResult<f64> {
        if observed.is_empty() {
            return Err(SurrogateError::InvalidMetricInput { reason: "no observations" });
        }
        if observed.len() != predicted.len() {
            return Err(SurrogateError::InvalidMetricInput {
                reason: "observed and predicted lengths differ",
            });
        }
        let n = observed.len() as f64;
        let pairs = observed.iter().zip(predicted);
        let value = match self {
            RegressionMetric::Mae => pairs.map(|(o, p)| (o - p).abs()).sum::<f64>() / n,
            RegressionMetric::Msd => pairs.map(|(o, p)| (o - p).powi(2)).sum::<f64>() / n,
            RegressionMetric::R2 => {
                let mean = mean(observed);
                let ss_res: f64 = pairs.map(|(o, p)| (o - p).powi(2)).sum();
                let ss_tot: f64 = observed.iter().map(|o| (o - mean).powi(2)).sum();
                1.0 - ss_res / ss_tot
            }
            RegressionMetric::Mape => {
                let terms: Vec<f64> =
                    pairs.filter(|(o, _)| **o != 0.0).map(|(o, p)| ((o - p) / o).abs()).collect();
                if terms.is_empty() {
                    return Err(SurrogateError::InvalidMetricInput {
                        reason: "all observations are zero",
                    });
                }
                terms.iter().sum::<f64>() / terms.len() as f64
            }
            RegressionMetric::Pearson => {
                let (mo, mp) = (mean(observed), mean(predicted));
                let cov: f64 = pairs.map(|(o, p)| (o - mo) * (p - mp)).sum();
                let so: f64 = observed.iter().map(|o| (o - mo).powi(2)).sum::<f64>().sqrt();
                let sp: f64 = predicted.iter().map(|p| (p - mp).powi(2)).sum::<f64>().sqrt();
                cov / (so * sp)
            }
        };
        Ok(value)
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}
