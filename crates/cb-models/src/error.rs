//! Model-related error types

use thiserror::Error;

use cb_core::data::DataError;

/// Why a regression could not be fitted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitFailure {
    /// Fewer observations than parameters leaves no residual degrees of freedom
    #[error("not enough data: {n_samples} observations for {n_params} parameters")]
    InsufficientData { n_samples: usize, n_params: usize },

    #[error("design matrix has rank {rank} for {columns} columns")]
    RankDeficient { rank: usize, columns: usize },

    /// Constant response; R² and the F-test are undefined
    #[error("response has zero variance")]
    ZeroVariance,

    #[error("non-finite values in {0}")]
    NonFinite(&'static str),

    #[error("distribution error: {0}")]
    Distribution(String),
}

/// Model-related errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Regression fit failed: {0}")]
    RegressionFit(#[from] FitFailure),

    /// Data-related error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Numerical computation error
    #[error("Numerical error: {message} (operation: {operation})")]
    NumericalError {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// Invalid model configuration
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },
}
