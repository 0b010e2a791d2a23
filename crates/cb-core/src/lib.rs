//! Core data handling for Carbitrage
//!
//! Loading listing exports into a columnar [`DataFrame`](data::DataFrame),
//! filtering them, and building design matrices for regression.

pub mod config;
pub mod data;
pub mod design;
pub mod error;
pub mod filter;
pub mod linalg;
pub mod loader;

pub use config::{LoaderConfig, PipelineConfig};
pub use design::{DesignMatrix, DesignMatrixBuilder, DesignMatrixSpec, LogTransform};
pub use error::{CoreError, Result};
pub use filter::{Constraint, FilterEngine, FilterSpec, OutlierPolicy};
