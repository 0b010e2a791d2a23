//! Linear regression result structure
//!
//! Everything a fitted OLS model exposes: the coefficient table,
//! goodness-of-fit statistics, and per-row fitted values and residuals.

use serde::{Deserialize, Serialize};
use std::fmt;

use cb_core::data::DataError;

use crate::base::{Coefficient, ModelStatistics, ModelSummary, ResidualStatistics, Result};
use crate::lm::ols::{Matrix, Vector};

/// Column where values start in the text report
const LABEL_WIDTH: usize = 21;

/// Fitted OLS regression
///
/// Created fresh for every fit and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Response column name
    pub target: String,
    /// One entry per design column, in design order
    pub coefficients: Vec<Coefficient>,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Fitted values (ŷ)
    pub fitted_values: Vector,
    /// Residuals (y - ŷ)
    pub residuals: Vector,
    /// Response vector (y)
    pub actual: Vector,
    /// Level of the coefficient confidence intervals
    pub confidence_level: f64,
}

impl RegressionResult {
    pub(crate) fn new(
        target: String,
        coefficients: Vec<Coefficient>,
        model_statistics: ModelStatistics,
        fitted_values: Vector,
        residuals: Vector,
        actual: Vector,
        confidence_level: f64,
    ) -> Self {
        Self {
            target,
            coefficients,
            model_statistics,
            fitted_values,
            residuals,
            actual,
            confidence_level,
        }
    }

    /// Get the number of observations
    pub fn n_obs(&self) -> usize {
        self.actual.len()
    }

    /// Get the number of estimated parameters, intercept included
    pub fn n_predictors(&self) -> usize {
        self.coefficients.len()
    }

    pub fn r_squared(&self) -> f64 {
        self.model_statistics.r_squared
    }

    pub fn adj_r_squared(&self) -> f64 {
        self.model_statistics.adj_r_squared
    }

    /// Residual sum of squares
    pub fn rss(&self) -> f64 {
        self.residuals.mapv(|r| r * r).sum()
    }

    /// Coefficient estimates in design order
    pub fn estimates(&self) -> Vector {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }

    /// Look up a coefficient by design column name
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Coefficients with p-value below `alpha`, intercept excluded
    pub fn significant_terms(&self, alpha: f64) -> Vec<&Coefficient> {
        self.coefficients
            .iter()
            .filter(|c| !c.is_intercept && c.is_significant(alpha))
            .collect()
    }

    /// Change in the response for a 1% increase in the variable behind a
    /// log-transformed predictor: `β · ln(1.01)`
    pub fn percent_change_effect(&self, name: &str) -> Option<f64> {
        self.coefficient(name)
            .map(|c| c.estimate * 1.01f64.ln())
    }

    /// Get predictions for new rows laid out like the design matrix
    pub fn predict(&self, x_new: &Matrix) -> Result<Vector> {
        if x_new.ncols() != self.coefficients.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} columns", self.coefficients.len()),
                actual: format!("{} columns", x_new.ncols()),
            }
            .into());
        }
        Ok(x_new.dot(&self.estimates()))
    }

    /// Model formula, `target ~ term + term + ...`
    pub fn formula(&self) -> String {
        let terms: Vec<&str> = self
            .coefficients
            .iter()
            .filter(|c| !c.is_intercept)
            .map(|c| c.name.as_str())
            .collect();
        if terms.is_empty() {
            format!("{} ~ 1", self.target)
        } else {
            format!("{} ~ {}", self.target, terms.join(" + "))
        }
    }

    /// Get model summary
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            formula: self.formula(),
            n_obs: self.n_obs(),
            n_predictors: self.n_predictors(),
            confidence_level: self.confidence_level,
            coefficients: self.coefficients.clone(),
            model_statistics: self.model_statistics,
            residual_statistics: ResidualStatistics::from_residuals(&self.residuals),
        }
    }
}

impl fmt::Display for RegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.model_statistics;
        writeln!(f, "Linear Regression Results")?;
        writeln!(f, "========================")?;
        writeln!(f, "{:<LABEL_WIDTH$}{}", "Formula:", self.formula())?;
        writeln!(f, "{:<LABEL_WIDTH$}{}", "Observations:", self.n_obs())?;
        writeln!(f, "{:<LABEL_WIDTH$}{}", "Predictors:", self.n_predictors())?;
        writeln!(f)?;

        let mut rows = vec![
            ("R-squared:", stats.r_squared),
            ("Adjusted R-squared:", stats.adj_r_squared),
        ];
        if let Some(f_stat) = stats.f_statistic {
            rows.push(("F-statistic:", f_stat));
        }
        if let Some(p_val) = stats.f_p_value {
            rows.push(("F p-value:", p_val));
        }
        rows.extend([
            ("Residual Std Error:", stats.residual_std_error),
            ("AIC:", stats.aic),
            ("BIC:", stats.bic),
        ]);

        for (label, value) in rows {
            writeln!(f, "{:<LABEL_WIDTH$}{:.4}", label, value)?;
        }
        Ok(())
    }
}
