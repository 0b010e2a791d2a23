//! Model summary structures

use super::coefficient::Coefficient;
use super::statistics::{ModelStatistics, ResidualStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Printable summary of a fitted regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model formula, e.g. `price ~ log_odometer + make[toyota]`
    pub formula: String,
    /// Number of observations
    pub n_obs: usize,
    /// Number of predictors (including intercept)
    pub n_predictors: usize,
    /// Level of the coefficient intervals
    pub confidence_level: f64,
    /// Coefficients table
    pub coefficients: Vec<Coefficient>,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Residual statistics
    pub residual_statistics: ResidualStatistics,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OLS Regression Summary")?;
        writeln!(f, "======================")?;
        writeln!(f, "Formula: {}", self.formula)?;
        writeln!(f, "Observations: {}", self.n_obs)?;
        writeln!(f, "Predictors: {}", self.n_predictors)?;
        writeln!(f)?;

        let r = &self.residual_statistics;
        writeln!(f, "Residuals:")?;
        writeln!(
            f,
            "{:>12} {:>12} {:>12} {:>12} {:>12}",
            "Min", "1Q", "Median", "3Q", "Max"
        )?;
        writeln!(
            f,
            "{:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            r.min, r.q1, r.median, r.q3, r.max
        )?;
        writeln!(f)?;

        // Coefficients
        let ci_label = format!("{:.1}%", self.confidence_level * 100.0);
        writeln!(f, "Coefficients ({} confidence):", ci_label)?;
        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Term", "Estimate", "Std Error", "t-value", "p-value", "CI lower", "CI upper"
        )?;
        writeln!(
            f,
            "{:-<20} {:-<12} {:-<12} {:-<12} {:-<12} {:-<12} {:-<12}",
            "", "", "", "", "", "", ""
        )?;

        for coeff in &self.coefficients {
            writeln!(
                f,
                "{:<20} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                coeff.name,
                coeff.estimate,
                coeff.std_error.unwrap_or(f64::NAN),
                coeff.t_stat.unwrap_or(f64::NAN),
                coeff.p_value.unwrap_or(f64::NAN),
                coeff.ci_lower.unwrap_or(f64::NAN),
                coeff.ci_upper.unwrap_or(f64::NAN)
            )?;
        }
        writeln!(f)?;

        // Model statistics
        let stats = &self.model_statistics;
        writeln!(f, "Model Statistics:")?;
        writeln!(f, "  R-squared: {:.4}", stats.r_squared)?;
        writeln!(f, "  Adjusted R-squared: {:.4}", stats.adj_r_squared)?;
        if let (Some(f_stat), Some(f_p)) = (stats.f_statistic, stats.f_p_value) {
            writeln!(
                f,
                "  F-statistic: {:.4} on {} and {} DF, p-value: {:.4e}",
                f_stat, stats.df_model, stats.df_residual, f_p
            )?;
        }
        writeln!(f, "  Log-likelihood: {:.4}", stats.log_likelihood)?;
        writeln!(f, "  AIC: {:.4}", stats.aic)?;
        writeln!(f, "  BIC: {:.4}", stats.bic)?;
        writeln!(
            f,
            "  Residual Std. Error: {:.4} on {} DF",
            stats.residual_std_error, stats.df_residual
        )?;

        Ok(())
    }
}
