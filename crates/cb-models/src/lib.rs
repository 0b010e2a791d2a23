//! Regression models and the filter-and-fit pipeline for Carbitrage

pub mod base;
pub mod error;
pub mod lm;
pub mod pipeline;

pub use base::{Coefficient, ModelSummary};
pub use error::{FitFailure, ModelError};
pub use lm::{FitConfig, OlsFitter, RegressionResult};
pub use pipeline::{
    FilterRequest, FitReport, MileageReport, PipelineError, ResidualPoint, Session,
};
