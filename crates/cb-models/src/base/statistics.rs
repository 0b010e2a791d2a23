//! Statistical structures for model results

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use cb_core::data::quantile;

/// Goodness-of-fit statistics of a least squares fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// `sqrt(RSS / (n - p))`
    pub residual_std_error: f64,
    /// Overall F-test; absent for an intercept-only model
    pub f_statistic: Option<f64>,
    pub f_p_value: Option<f64>,
    /// Gaussian log-likelihood at the maximum likelihood variance
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Residual degrees of freedom (`n - p`)
    pub df_residual: usize,
    /// Model degrees of freedom (`p - 1`)
    pub df_model: usize,
}

/// Residual statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualStatistics {
    /// Minimum residual
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Maximum residual
    pub max: f64,
    /// Mean residual
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
}

impl ResidualStatistics {
    pub fn from_residuals(residuals: &Array1<f64>) -> Self {
        let values = residuals.to_vec();
        let std_dev = if values.len() > 1 {
            residuals.std(1.0)
        } else {
            0.0
        };

        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            q1: quantile(&values, 0.25).unwrap_or(f64::NAN),
            median: quantile(&values, 0.5).unwrap_or(f64::NAN),
            q3: quantile(&values, 0.75).unwrap_or(f64::NAN),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: residuals.mean().unwrap_or(f64::NAN),
            std_dev,
        }
    }
}
