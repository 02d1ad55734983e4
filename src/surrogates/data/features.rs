//! Input and output feature declarations and the input preprocessing that
//! turns a raw feature table into the numeric matrix `X'`.
//!
//! Layout of `X'`: features in declaration order; continuous and task
//! features contribute one column named after the feature; categorical
//! features contribute one column per category (`"{key}_{category}"`) under
//! one-hot encoding, or a single ordinal column named after the feature.
use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::surrogates::{
    data::table::{ColumnValues, DataTable},
    errors::{SurrogateError, SurrogateResult},
};

/// One declared input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputFeature {
    /// Real-valued input with declared bounds `(lower, upper)`.
    Continuous { key: String, bounds: (f64, f64) },
    /// Finite set of string categories.
    Categorical { key: String, categories: Vec<String> },
    /// Task / fidelity index; values are integers `0..task_count`.
    Task { key: String },
}

impl InputFeature {
    pub fn continuous(key: impl Into<String>, lower: f64, upper: f64) -> Self {
        InputFeature::Continuous { key: key.into(), bounds: (lower, upper) }
    }

    pub fn categorical<S: Into<String>>(key: impl Into<String>, categories: Vec<S>) -> Self {
        InputFeature::Categorical {
            key: key.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    pub fn task(key: impl Into<String>) -> Self {
        InputFeature::Task { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            InputFeature::Continuous { key, .. }
            | InputFeature::Categorical { key, .. }
            | InputFeature::Task { key } => key,
        }
    }
}

/// Encoding applied to a categorical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoricalEncoding {
    #[default]
    OneHot,
    Ordinal,
}

/// Per-feature encodings keyed by feature key. Categorical features not
/// listed default to one-hot.
pub type InputPreprocessingSpecs = BTreeMap<String, CategoricalEncoding>;

/// Ordered input declarations with unique keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<InputFeature>", into = "Vec<InputFeature>")]
pub struct Inputs {
    features: Vec<InputFeature>,
}

/// Numeric inputs produced by [`Inputs::transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedInputs {
    /// Column names of `X'`.
    pub columns: Vec<String>,
    /// `X'`, one row per training row.
    pub matrix: Array2<f64>,
}

impl TransformedInputs {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl Inputs {
    /// # Errors
    /// - [`SurrogateError::DuplicateKey`] for repeated keys.
    /// - [`SurrogateError::InvalidSpecification`] for empty inputs, bounds
    ///   with `lower > upper` or non-finite bounds, categorical features
    ///   without categories, and one-hot column names that collide with a
    ///   feature key or with each other.
    pub fn new(features: Vec<InputFeature>) -> SurrogateResult<Self> {
        if features.is_empty() {
            return Err(SurrogateError::InvalidSpecification {
                field: "inputs",
                reason: "at least one input feature is required".to_string(),
            });
        }
        for (i, feat) in features.iter().enumerate() {
            if features[..i].iter().any(|f| f.key() == feat.key()) {
                return Err(SurrogateError::DuplicateKey { key: feat.key().to_string() });
            }
            match feat {
                InputFeature::Continuous { key, bounds: (lo, hi) } => {
                    if !lo.is_finite() || !hi.is_finite() || lo > hi {
                        return Err(SurrogateError::InvalidSpecification {
                            field: "inputs",
                            reason: format!("feature '{key}' has invalid bounds ({lo}, {hi})"),
                        });
                    }
                }
                InputFeature::Categorical { key, categories } if categories.is_empty() => {
                    return Err(SurrogateError::InvalidSpecification {
                        field: "inputs",
                        reason: format!("categorical feature '{key}' has no categories"),
                    });
                }
                _ => {}
            }
        }
        verify_column_names(&features)?;
        Ok(Self { features })
    }

    pub fn features(&self) -> &[InputFeature] {
        &self.features
    }

    pub fn get(&self, key: &str) -> Option<&InputFeature> {
        self.features.iter().find(|f| f.key() == key)
    }

    pub fn task_features(&self) -> impl Iterator<Item = &InputFeature> {
        self.features.iter().filter(|f| matches!(f, InputFeature::Task { .. }))
    }

    /// Column names of `X'` under `specs`, one entry per feature:
    /// `(feature, columns it produces)`.
    pub fn layout(&self, specs: &InputPreprocessingSpecs) -> Vec<(&InputFeature, Vec<String>)> {
        self.features
            .iter()
            .map(|feat| {
                let cols = match feat {
                    InputFeature::Categorical { key, categories }
                        if encoding_of(specs, key) == CategoricalEncoding::OneHot =>
                    {
                        categories.iter().map(|c| format!("{key}_{c}")).collect()
                    }
                    other => vec![other.key().to_string()],
                };
                (feat, cols)
            })
            .collect()
    }

    /// transform — encode a raw feature table into `X'`.
    ///
    /// Parameters
    /// ----------
    /// - `table`: raw features; must contain a column for every declared
    ///   feature (extra columns are ignored).
    /// - `specs`: categorical encodings.
    ///
    /// Errors
    /// ------
    /// - [`SurrogateError::MissingTaskColumn`] if a task feature's column is
    ///   absent; [`SurrogateError::MissingInputColumn`] for other features.
    /// - [`SurrogateError::ColumnTypeMismatch`] for numeric/categorical
    ///   mix-ups, [`SurrogateError::UnknownCategory`] for undeclared
    ///   categories.
    pub fn transform(
        &self, table: &DataTable, specs: &InputPreprocessingSpecs,
    ) -> SurrogateResult<TransformedInputs> {
        let layout = self.layout(specs);
        let n_cols: usize = layout.iter().map(|(_, cols)| cols.len()).sum();
        let n_rows = table.n_rows();
        let mut matrix = Array2::<f64>::zeros((n_rows, n_cols));
        let mut columns = Vec::with_capacity(n_cols);
        let mut offset = 0;

        for (feat, cols) in layout {
            match feat {
                InputFeature::Task { key } => {
                    let values =
                        table.numeric(key, |key| SurrogateError::MissingTaskColumn { key })?;
                    matrix.column_mut(offset).assign(&ndarray::ArrayView1::from(values));
                }
                InputFeature::Continuous { key, .. } => {
                    let values =
                        table.numeric(key, |key| SurrogateError::MissingInputColumn { key })?;
                    matrix.column_mut(offset).assign(&ndarray::ArrayView1::from(values));
                }
                InputFeature::Categorical { key, categories } => {
                    let values = match table.column(key).map(|c| &c.values) {
                        Some(ColumnValues::Categorical(v)) => v,
                        Some(ColumnValues::Numeric(_)) => {
                            return Err(SurrogateError::ColumnTypeMismatch {
                                key: key.clone(),
                                expected: "categorical",
                            });
                        }
                        None => return Err(SurrogateError::MissingInputColumn { key: key.clone() }),
                    };
                    let one_hot = encoding_of(specs, key) == CategoricalEncoding::OneHot;
                    for (row, value) in values.iter().enumerate() {
                        let idx = categories.iter().position(|c| c == value).ok_or_else(|| {
                            SurrogateError::UnknownCategory {
                                key: key.clone(),
                                row,
                                value: value.clone(),
                            }
                        })?;
                        if one_hot {
                            matrix[[row, offset + idx]] = 1.0;
                        } else {
                            matrix[[row, offset]] = idx as f64;
                        }
                    }
                }
            }
            offset += cols.len();
            columns.extend(cols);
        }
        Ok(TransformedInputs { columns, matrix })
    }
}

/// Every `X'` column name must be unique under any encoding: one-hot names
/// `"{key}_{category}"` may not repeat or shadow another feature's key.
fn verify_column_names(features: &[InputFeature]) -> SurrogateResult<()> {
    let keys: BTreeSet<&str> = features.iter().map(InputFeature::key).collect();
    let mut generated = BTreeSet::new();
    for feat in features {
        if let InputFeature::Categorical { key, categories } = feat {
            for category in categories {
                let name = format!("{key}_{category}");
                if keys.contains(name.as_str()) || !generated.insert(name.clone()) {
                    return Err(SurrogateError::InvalidSpecification {
                        field: "inputs",
                        reason: format!("one-hot column '{name}' of '{key}' collides with another column"),
                    });
                }
            }
        }
    }
    Ok(())
}

fn encoding_of(specs: &InputPreprocessingSpecs, key: &str) -> CategoricalEncoding {
    specs.get(key).copied().unwrap_or_default()
}

impl TryFrom<Vec<InputFeature>> for Inputs {
    type Error = SurrogateError;

    fn try_from(features: Vec<InputFeature>) -> Result<Self, Self::Error> {
        Inputs::new(features)
    }
}

impl From<Inputs> for Vec<InputFeature> {
    fn from(inputs: Inputs) -> Self {
        inputs.features
    }
}

/// Ordered continuous outputs with unique keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Outputs {
    keys: Vec<String>,
}

impl Outputs {
    /// # Errors
    /// [`SurrogateError::InvalidSpecification`] for no outputs,
    /// [`SurrogateError::DuplicateKey`] for repeated keys.
    pub fn new<S: Into<String>>(keys: Vec<S>) -> SurrogateResult<Self> {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(SurrogateError::InvalidSpecification {
                field: "outputs",
                reason: "at least one output is required".to_string(),
            });
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(SurrogateError::DuplicateKey { key: key.clone() });
            }
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl TryFrom<Vec<String>> for Outputs {
    type Error = SurrogateError;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        Outputs::new(keys)
    }
}

impl From<Outputs> for Vec<String> {
    fn from(outputs: Outputs) -> Self {
        outputs.keys
    }
}
