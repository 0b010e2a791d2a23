//! Result types shared by fitted models
//!
//! Coefficient tables, goodness-of-fit statistics and printable summaries.

pub use coefficient::Coefficient;
pub use statistics::ModelStatistics;
pub use statistics::ResidualStatistics;
pub use summary::ModelSummary;

pub use crate::error::{FitFailure, ModelError};

pub mod coefficient;
pub mod statistics;
pub mod summary;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
