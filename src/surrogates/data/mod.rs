//! data — training tables and feature declarations.
//!
//! - [`table`]: ordered, named columns ([`DataTable`]) for raw features and
//!   targets.
//! - [`features`]: input/output declarations and the preprocessing that
//!   encodes a raw feature table into the numeric matrix `X'`.

pub mod features;
pub mod table;

pub use self::features::{
    CategoricalEncoding, InputFeature, InputPreprocessingSpecs, Inputs, Outputs, TransformedInputs,
};
pub use self::table::{Column, ColumnValues, DataTable};
