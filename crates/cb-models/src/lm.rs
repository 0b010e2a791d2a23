//! Linear regression models
//!
//! Ordinary least squares over a [`DesignMatrix`](cb_core::design::DesignMatrix),
//! solved through the SVD of the design so that ill-conditioned listings
//! data never goes through an explicit `X'X` inverse.

pub mod ols;
pub mod result;


pub use ols::OlsFitter;
pub use result::RegressionResult;

use serde::{Deserialize, Serialize};

use crate::base::{ModelError, Result};

/// Linear model configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Confidence level for coefficient intervals
    pub confidence_level: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

impl FitConfig {
    pub fn with_confidence_level(confidence_level: f64) -> Result<Self> {
        let config = Self { confidence_level };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ModelError::InvalidConfig {
                message: format!(
                    "confidence level must be in (0, 1), got {}",
                    self.confidence_level
                ),
            });
        }
        Ok(())
    }
}
