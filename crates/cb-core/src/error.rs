use std::path::PathBuf;

use crate::data::DataError;

/// Errors raised by the loading, filtering and design-matrix stages
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Data unavailable at '{}': {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("Filters produced no rows")]
    EmptyFilterResult,

    #[error("No predictors selected: {0}")]
    EmptyPredictorSet(&'static str),

    #[error("Singular design matrix: rank {rank} for {columns} columns")]
    SingularDesignMatrix { rank: usize, columns: usize },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Invalid outlier policy: {0}")]
    InvalidOutlierPolicy(String),

    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        CoreError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error ends the session rather than a single request
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::DataUnavailable { .. } | CoreError::Config(_))
    }
}

/// Result type for core pipeline stages
pub type Result<T> = std::result::Result<T, CoreError>;
