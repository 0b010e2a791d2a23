//! Ordinary Least Squares (OLS) linear regression
//!
//! This module implements the standard linear regression model
//! using the ordinary least squares estimator.

use log::debug;
use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use cb_core::data::DataError;
use cb_core::design::{DesignMatrix, INTERCEPT};
use cb_core::linalg::{self, LeastSquares};

use crate::base::{Coefficient, FitFailure, ModelError, ModelStatistics, Result};
use crate::lm::{FitConfig, RegressionResult};

// ==================== Type Definitions ====================

/// Matrix type alias for 2D arrays
pub type Matrix = Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = Array1<f64>;

/// Lower bound on standard errors, keeps t-statistics finite for exact fits
const MIN_STD_ERROR: f64 = 1e-10;

/// Name used for the response when fitting raw arrays
const DEFAULT_TARGET: &str = "y";

// ==================== Fitter ====================

/// OLS estimator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OlsFitter {
    config: FitConfig,
}

impl OlsFitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit the response of `design` on its columns
    pub fn fit(&self, design: &DesignMatrix) -> Result<RegressionResult> {
        self.fit_named(
            &design.matrix,
            &design.target,
            &design.column_names,
            &design.target_name,
        )
    }

    /// Fit `target` on the columns of `matrix`, labelled by `names`
    ///
    /// Any constant non-zero column acts as the intercept, whatever its
    /// name. Then R² is centred and the F-test compares against the
    /// intercept-only model. Without one both are taken about zero.
    pub fn fit_arrays(
        &self,
        matrix: &Matrix,
        target: &Vector,
        names: &[String],
    ) -> Result<RegressionResult> {
        self.fit_named(matrix, target, names, DEFAULT_TARGET)
    }

    fn fit_named(
        &self,
        x: &Matrix,
        y: &Vector,
        names: &[String],
        target_name: &str,
    ) -> Result<RegressionResult> {
        // Check dimensions
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} response values", n),
                actual: format!("{} response values", y.len()),
            }
            .into());
        }
        if names.len() != p {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} column names", p),
                actual: format!("{} column names", names.len()),
            }
            .into());
        }
        if !x.iter().all(|v| v.is_finite()) {
            return Err(FitFailure::NonFinite("design matrix").into());
        }
        if !y.iter().all(|v| v.is_finite()) {
            return Err(FitFailure::NonFinite("response").into());
        }
        if n <= p {
            return Err(FitFailure::InsufficientData {
                n_samples: n,
                n_params: p,
            }
            .into());
        }

        let y_mean = y.mean().unwrap_or(0.0);
        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        if tss <= f64::EPSILON * y.dot(y) {
            return Err(FitFailure::ZeroVariance.into());
        }

        // Fit using the SVD (numerically stable)
        let ls = self.svd_solve(x, y)?;
        if ls.rank < p {
            return Err(FitFailure::RankDeficient {
                rank: ls.rank,
                columns: p,
            }
            .into());
        }
        let estimates = &ls.solution;

        // Calculate fitted values and residuals
        let fitted_values = x.dot(estimates);
        let residuals = y - &fitted_values;

        let intercept = intercept_column(x, names);
        if let Some(j) = intercept.filter(|&j| names[j] != INTERCEPT) {
            debug!("ols: constant column '{}' used as intercept", names[j]);
        }
        let (total, df_total) = match intercept {
            Some(_) => (tss, n - 1),
            None => (y.dot(y), n),
        };

        // Calculate basic statistics
        let rss = residuals.mapv(|r| r * r).sum();
        let df_residual = n - p;
        let r_squared = 1.0 - rss / total;
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (df_total as f64 / df_residual as f64);
        let residual_std_error = (rss / df_residual as f64).sqrt();
        let df_model = df_total - df_residual;

        let coefficients: Vec<Coefficient> = self
            .calculate_inference(estimates, &ls.xtx_inv, rss, df_residual, names)?
            .into_iter()
            .enumerate()
            .map(|(j, c)| c.intercept(intercept == Some(j)))
            .collect();

        let (f_statistic, f_p_value) = match df_model {
            0 => (None, None),
            _ => {
                let (f, p_value) = self.f_statistic(total - rss, rss, df_model, df_residual)?;
                (Some(f), Some(p_value))
            }
        };

        // Calculate log-likelihood and information criteria
        let log_likelihood = self.log_likelihood(n, rss);
        let aic = 2.0 * p as f64 - 2.0 * log_likelihood;
        let bic = (n as f64).ln() * p as f64 - 2.0 * log_likelihood;

        let model_statistics = ModelStatistics {
            r_squared,
            adj_r_squared,
            residual_std_error,
            f_statistic,
            f_p_value,
            log_likelihood,
            aic,
            bic,
            df_residual,
            df_model,
        };

        debug!(
            "ols: n={} p={} r2={:.4} rse={:.4}",
            n, p, r_squared, residual_std_error
        );

        Ok(RegressionResult::new(
            target_name.to_string(),
            coefficients,
            model_statistics,
            fitted_values,
            residuals,
            y.clone(),
            self.config.confidence_level,
        ))
    }

    /// Solve using the singular value decomposition
    fn svd_solve(&self, x: &Matrix, y: &Vector) -> Result<LeastSquares> {
        linalg::least_squares(x, y).map_err(|e| ModelError::NumericalError {
            message: e.to_string(),
            operation: "svd_solve".to_string(),
        })
    }

    /// Standard errors, t-tests and confidence intervals
    ///
    /// The coefficient covariance is `σ² (X'X)^{-1}` with `(X'X)^{-1}` taken
    /// from the SVD as `V Σ^{-2} V'`.
    fn calculate_inference(
        &self,
        estimates: &Vector,
        xtx_inv: &Matrix,
        rss: f64,
        df: usize,
        names: &[String],
    ) -> Result<Vec<Coefficient>> {
        // σ² = RSS / (n - p)
        let sigma2 = rss / df as f64;

        let t_dist = StudentsT::new(0.0, 1.0, df as f64)
            .map_err(|e| FitFailure::Distribution(format!("t-distribution: {}", e)))?;
        let alpha = 1.0 - self.config.confidence_level;
        let t_critical = t_dist.inverse_cdf(1.0 - alpha / 2.0);

        Ok(names
            .iter()
            .zip(estimates.iter())
            .zip(xtx_inv.diag().iter())
            .map(|((name, &estimate), &v)| {
                let se = (sigma2 * v).sqrt().max(MIN_STD_ERROR);
                Coefficient::tested(name.clone(), estimate, se, &t_dist, t_critical)
            })
            .collect())
    }

    /// Overall F-test of the model against the intercept-only model
    fn f_statistic(
        &self,
        explained: f64,
        rss: f64,
        df_model: usize,
        df_residual: usize,
    ) -> Result<(f64, f64)> {
        let f_statistic = (explained / df_model as f64) / (rss / df_residual as f64);
        if !f_statistic.is_finite() {
            // exact fit
            return Ok((f64::INFINITY, 0.0));
        }

        let f_dist = FisherSnedecor::new(df_model as f64, df_residual as f64)
            .map_err(|e| FitFailure::Distribution(format!("F-distribution: {}", e)))?;
        let f_p_value = (1.0 - f_dist.cdf(f_statistic)).clamp(0.0, 1.0);

        Ok((f_statistic, f_p_value))
    }

    /// Gaussian log-likelihood at the maximum likelihood variance `RSS / n`
    fn log_likelihood(&self, n: usize, rss: f64) -> f64 {
        let n = n as f64;
        let sigma2 = rss / n;
        -0.5 * n * (2.0 * std::f64::consts::PI * sigma2).ln() - 0.5 * n
    }
}

/// Index of the intercept: the `(Intercept)` column, else the first
/// constant non-zero column
fn intercept_column(x: &Matrix, names: &[String]) -> Option<usize> {
    if let Some(j) = names.iter().position(|name| name == INTERCEPT) {
        return Some(j);
    }
    x.columns().into_iter().position(|col| {
        let first = col[0];
        first != 0.0 && col.iter().all(|&v| v == first)
    })
}
