//! Coefficient definition

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// One fitted design column with its t-test
///
/// Inference fields are `None` only for coefficients built by hand with
/// [`Coefficient::new`]; the OLS fitter always fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// Design column the coefficient belongs to
    pub name: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub t_stat: Option<f64>,
    /// Two-sided p-value
    pub p_value: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
    pub is_intercept: bool,
}

impl Coefficient {
    /// Bare estimate without inference
    pub fn new(name: impl Into<String>, estimate: f64) -> Self {
        Self {
            name: name.into(),
            estimate,
            std_error: None,
            t_stat: None,
            p_value: None,
            ci_lower: None,
            ci_upper: None,
            is_intercept: false,
        }
    }

    /// Test `estimate = 0` against `t_dist` and attach the interval
    /// `estimate ± t_critical · std_error`
    pub(crate) fn tested(
        name: impl Into<String>,
        estimate: f64,
        std_error: f64,
        t_dist: &StudentsT,
        t_critical: f64,
    ) -> Self {
        let t = estimate / std_error;
        let p = if t.is_finite() {
            (2.0 * (1.0 - t_dist.cdf(t.abs()))).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let margin = t_critical * std_error;

        Self {
            std_error: Some(std_error),
            t_stat: Some(t),
            p_value: Some(p),
            ci_lower: Some(estimate - margin),
            ci_upper: Some(estimate + margin),
            ..Self::new(name, estimate)
        }
    }

    pub(crate) fn intercept(mut self, is_intercept: bool) -> Self {
        self.is_intercept = is_intercept;
        self
    }

    /// Whether the p-value falls below `alpha`; `false` without a p-value
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value.is_some_and(|p| p < alpha)
    }
}
