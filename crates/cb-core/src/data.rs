//! Columnar data structures for listing tables
//!
//! A [`DataFrame`] holds named, equally long [`Series`]. Numeric series use
//! `NaN` as the missing marker and string series use `None`, so a loaded
//! spreadsheet keeps its blanks without a separate validity bitmap.

mod dataframe;
mod series;
mod utils;


// Re-exports
pub use dataframe::DataFrame;
pub use series::{Series, SeriesStats, SeriesValue};
pub use utils::{compare_labels, pearson, quantile, ColumnType};

// Type aliases for common use cases
pub type FloatArray = ndarray::Array1<f64>;
pub type StringArray = Vec<Option<String>>;
pub type Matrix = ndarray::Array2<f64>;

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid column type for '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Operation requires numeric data, got {0}")]
    NonNumericData(&'static str),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;
