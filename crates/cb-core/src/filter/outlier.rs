use serde::{Deserialize, Serialize};

use crate::data::{quantile, DataError, DataFrame, Series};
use crate::error::{CoreError, Result};

/// Rule excluding extreme values of one numeric column
///
/// Rows whose value lies outside the keep-band, or is missing, are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlierPolicy {
    /// Keep every row
    #[default]
    None,
    /// Keep `[Q1 - k*IQR, Q3 + k*IQR]`
    Iqr { column: String, k: f64 },
    /// Keep `value <= max`
    Threshold { column: String, max: f64 },
    /// Keep `mean ± n*std` (sample standard deviation)
    StdDev { column: String, n: f64 },
}

impl OutlierPolicy {
    pub fn iqr(column: impl Into<String>, k: f64) -> Self {
        OutlierPolicy::Iqr {
            column: column.into(),
            k,
        }
    }

    /// Tukey fences on price with the usual `k = 1.5`
    pub fn price_iqr() -> Self {
        Self::iqr("price", 1.5)
    }

    pub fn threshold(column: impl Into<String>, max: f64) -> Self {
        OutlierPolicy::Threshold {
            column: column.into(),
            max,
        }
    }

    /// Drop listings priced above `max`
    pub fn price_threshold(max: f64) -> Self {
        Self::threshold("price", max)
    }

    pub fn std_dev(column: impl Into<String>, n: f64) -> Self {
        OutlierPolicy::StdDev {
            column: column.into(),
            n,
        }
    }

    /// Column the policy inspects
    pub fn column(&self) -> Option<&str> {
        match self {
            OutlierPolicy::None => None,
            OutlierPolicy::Iqr { column, .. }
            | OutlierPolicy::Threshold { column, .. }
            | OutlierPolicy::StdDev { column, .. } => Some(column),
        }
    }

    /// Reject multipliers and thresholds that would silently empty the band
    pub fn validate(&self) -> Result<()> {
        let (name, value) = match self {
            OutlierPolicy::None => return Ok(()),
            OutlierPolicy::Iqr { k, .. } => ("k", *k),
            OutlierPolicy::StdDev { n, .. } => ("n", *n),
            OutlierPolicy::Threshold { max, .. } => {
                if max.is_nan() {
                    return Err(CoreError::InvalidOutlierPolicy(
                        "threshold max is NaN".to_string(),
                    ));
                }
                return Ok(());
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidOutlierPolicy(format!(
                "{} must be finite and non-negative, got {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Inclusive keep-band for `series`
    ///
    /// `None` when the policy keeps everything or the series has no values.
    pub fn bounds(&self, series: &Series) -> Result<Option<(f64, f64)>> {
        self.validate()?;
        let Some(column) = self.column() else {
            return Ok(None);
        };
        let values = match series {
            Series::Float(_) => series.present_values()?,
            Series::String(_) => {
                return Err(DataError::TypeMismatch {
                    column: column.to_string(),
                    expected: "float64",
                    actual: series.dtype(),
                }
                .into())
            }
        };
        if values.is_empty() {
            return Ok(None);
        }

        let band = match self {
            OutlierPolicy::None => return Ok(None),
            OutlierPolicy::Iqr { k, .. } => {
                let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75))
                else {
                    return Ok(None);
                };
                let iqr = q3 - q1;
                (q1 - k * iqr, q3 + k * iqr)
            }
            OutlierPolicy::Threshold { max, .. } => (f64::NEG_INFINITY, *max),
            OutlierPolicy::StdDev { n, .. } => {
                let mean = series.mean()?;
                // a single value has no spread
                let std = if values.len() > 1 { series.std(1)? } else { 0.0 };
                (mean - n * std, mean + n * std)
            }
        };
        Ok(Some(band))
    }

    /// Row mask of values inside the keep-band
    pub(crate) fn mask(&self, df: &DataFrame) -> Result<Vec<bool>> {
        self.validate()?;
        let Some(column) = self.column() else {
            return Ok(vec![true; df.nrows()]);
        };
        let series = df.column(column)?;
        let Some((lo, hi)) = self.bounds(series)? else {
            return Ok((0..df.nrows()).map(|i| !series.is_missing(i)).collect());
        };

        Ok((0..df.nrows())
            .map(|i| series.get_f64(i).is_some_and(|v| v >= lo && v <= hi))
            .collect())
    }
}
