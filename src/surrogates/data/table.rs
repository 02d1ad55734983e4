//! Column-oriented training tables.
//!
//! A [`DataTable`] is an ordered list of named columns of equal length.
//! Column order is preserved: the task column may sit anywhere, and the
//! pipeline locates it by name.
use serde::{Deserialize, Serialize};

use crate::surrogates::errors::{SurrogateError, SurrogateResult};

/// Values of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, rows: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Numeric(v) => ColumnValues::Numeric(rows.iter().map(|&r| v[r]).collect()),
            ColumnValues::Categorical(v) => {
                ColumnValues::Categorical(rows.iter().map(|&r| v[r].clone()).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self { key: key.into(), values: ColumnValues::Numeric(values) }
    }

    pub fn categorical<S: Into<String>>(key: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            key: key.into(),
            values: ColumnValues::Categorical(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// Ordered, named, equal-length columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct DataTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl DataTable {
    /// # Errors
    /// - [`SurrogateError::DuplicateKey`] if two columns share a key.
    /// - [`SurrogateError::ColumnLengthMismatch`] if lengths differ.
    pub fn new(columns: Vec<Column>) -> SurrogateResult<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.key == col.key) {
                return Err(SurrogateError::DuplicateKey { key: col.key.clone() });
            }
            if col.values.len() != n_rows {
                return Err(SurrogateError::ColumnLengthMismatch {
                    key: col.key.clone(),
                    expected: n_rows,
                    found: col.values.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Numeric values of `key`.
    ///
    /// # Errors
    /// [`SurrogateError::ColumnTypeMismatch`] for a categorical column. A
    /// missing column is reported with `missing` so callers pick the
    /// variant that names the right role (input, output, task).
    pub fn numeric(
        &self, key: &str, missing: impl FnOnce(String) -> SurrogateError,
    ) -> SurrogateResult<&[f64]> {
        match self.column(key).map(|c| &c.values) {
            Some(ColumnValues::Numeric(v)) => Ok(v),
            Some(ColumnValues::Categorical(_)) => Err(SurrogateError::ColumnTypeMismatch {
                key: key.to_string(),
                expected: "numeric",
            }),
            None => Err(missing(key.to_string())),
        }
    }

    /// Table restricted to `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> DataTable {
        DataTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column { key: c.key.clone(), values: c.values.select(rows) })
                .collect(),
            n_rows: rows.len(),
        }
    }
}

impl TryFrom<Vec<Column>> for DataTable {
    type Error = SurrogateError;

    fn try_from(columns: Vec<Column>) -> Result<Self, Self::Error> {
        DataTable::new(columns)
    }
}

impl From<DataTable> for Vec<Column> {
    fn from(table: DataTable) -> Self {
        table.columns
    }
}
