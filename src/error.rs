//! Error types
//!
//! Structural problems with an input table are detected at the boundary and
//! abort before anything is calculated. Degenerate statistics never surface
//! here: they are absorbed into 0 or "not applicable" by the stages themselves.

use thiserror::Error;

/// Structural errors found while building a [`crate::Dataset`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("dataset has no feature columns (only a Subzone ID column was found)")]
    NoFeatureColumns,

    #[error("no Subzone ID column found; available columns: {available:?}")]
    MissingIdColumn { available: Vec<String> },

    #[error("row {row}: Subzone ID is missing or blank")]
    MissingSubzoneId { row: usize },

    #[error("row {row}: duplicate Subzone ID '{id}' (first seen at row {first_row})")]
    DuplicateSubzoneId {
        id: String,
        first_row: usize,
        row: usize,
    },

    #[error("feature column '{name}' appears more than once")]
    DuplicateFeature { name: String },

    #[error("feature column '{column}' has {actual} values but the dataset has {expected} rows")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature column '{column}' is not numeric (row {row}: '{value}')")]
    NonNumericFeature {
        column: String,
        row: usize,
        value: String,
    },

    #[error("file is too large ({size_mb:.1} MB); maximum is {max_mb} MB")]
    FileTooLarge { size_mb: f64, max_mb: u64 },
}

/// Errors raised by the multi-component store
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("ecosystem component name must not be empty")]
    EmptyName,

    #[error("no ecosystem component named '{0}'")]
    UnknownComponent(String),
}

/// Top-level error for pipeline operations
#[derive(Debug, Error)]
pub enum EvaError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not determine whether the data is qualitative or quantitative; set the data type explicitly")]
    UndeterminedDataType,

    #[error("no dataset loaded")]
    NoDataset,
}

pub type EvaResult<T> = std::result::Result<T, EvaError>;
