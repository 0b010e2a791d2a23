//! Series data structure for holding homogeneous data
//!
//! A Series is a one-dimensional column of a [`DataFrame`](super::DataFrame).
//! Listing tables only need two physical types: numbers (price, odometer,
//! year, coordinates) and text (make, model, condition, ...).

use super::*;

use std::collections::HashSet;

/// A Series is a typed, one-dimensional array of data
#[derive(Clone, Debug)]
pub enum Series {
    /// Floating point numbers; `NaN` marks a missing value
    Float(FloatArray),
    /// Text values; `None` marks a missing value
    String(StringArray),
}

/// Missing values compare equal to each other, so a reloaded frame with gaps
/// equals the original
impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Series::Float(a), Series::Float(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
            }
            (Series::String(a), Series::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Series {
    /// Create a new Float series
    pub fn float(data: impl Into<FloatArray>) -> Self {
        Series::Float(data.into())
    }

    /// Create a new String series from present values
    pub fn string<T: AsRef<str>>(data: &[T]) -> Self {
        Series::String(data.iter().map(|s| Some(s.as_ref().to_string())).collect())
    }

    /// Create a new String series that may contain missing values
    pub fn optional_string(data: impl Into<StringArray>) -> Self {
        Series::String(data.into())
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        match self {
            Series::Float(arr) => arr.len(),
            Series::String(arr) => arr.len(),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name of the series
    pub fn dtype(&self) -> &'static str {
        self.column_type().name()
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Series::Float(_) => ColumnType::Float,
            Series::String(_) => ColumnType::String,
        }
    }

    /// Whether the value at `idx` is missing (or out of range)
    pub fn is_missing(&self, idx: usize) -> bool {
        match self {
            Series::Float(arr) => arr.get(idx).map_or(true, |v| v.is_nan()),
            Series::String(arr) => arr.get(idx).map_or(true, |v| v.is_none()),
        }
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Get a value at index; `None` when missing or out of range
    pub fn get(&self, idx: usize) -> Option<SeriesValue> {
        match self {
            Series::Float(arr) => arr
                .get(idx)
                .filter(|v| !v.is_nan())
                .map(|&v| SeriesValue::Float(v)),
            Series::String(arr) => arr
                .get(idx)
                .and_then(|v| v.as_ref())
                .map(|v| SeriesValue::String(v.clone())),
        }
    }

    /// Textual form of the value at `idx`, used for membership filters and
    /// categorical encoding. Whole numbers render without a fractional part.
    pub fn label(&self, idx: usize) -> Option<String> {
        self.get(idx).map(|v| v.to_string())
    }

    /// Numeric value at `idx`, if the series is numeric and the value present
    pub fn get_f64(&self, idx: usize) -> Option<f64> {
        match self {
            Series::Float(arr) => arr.get(idx).copied().filter(|v| !v.is_nan()),
            Series::String(_) => None,
        }
    }

    /// Borrow the underlying numeric array
    pub fn as_float(&self) -> Option<&FloatArray> {
        match self {
            Series::Float(arr) => Some(arr),
            Series::String(_) => None,
        }
    }

    /// Filter the series with a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("mask length {}", self.len()),
                actual: format!("mask length {}", mask.len()),
            });
        }

        match self {
            Series::Float(arr) => {
                let filtered: FloatArray = arr
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(&val, _)| val)
                    .collect();
                Ok(Series::Float(filtered))
            }
            Series::String(arr) => {
                let filtered: StringArray = arr
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(val, _)| val.clone())
                    .collect();
                Ok(Series::String(filtered))
            }
        }
    }

    /// Gather the values at `indices`, in that order
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&idx| idx >= len) {
            return Err(DataError::IndexOutOfBounds { index, len });
        }

        match self {
            Series::Float(arr) => Ok(Series::Float(
                indices.iter().map(|&idx| arr[idx]).collect(),
            )),
            Series::String(vec) => Ok(Series::String(
                indices.iter().map(|&idx| vec[idx].clone()).collect(),
            )),
        }
    }

    /// Present numeric values, in order
    pub fn present_values(&self) -> Result<Vec<f64>> {
        match self {
            Series::Float(arr) => Ok(arr.iter().copied().filter(|v| !v.is_nan()).collect()),
            Series::String(_) => Err(DataError::NonNumericData("string")),
        }
    }

    /// Sorted distinct labels of present values
    pub fn unique_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = (0..self.len())
            .filter_map(|i| self.label(i))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        labels.sort_by(|a, b| compare_labels(a, b));
        labels
    }

    /// Encode present values as level codes over the sorted distinct labels
    ///
    /// Returns one code per row (`None` for missing) and the level list.
    pub fn encode_levels(&self) -> (Vec<Option<usize>>, Vec<String>) {
        let levels = self.unique_labels();
        let codes = (0..self.len())
            .map(|i| {
                self.label(i)
                    .and_then(|label| levels.iter().position(|level| *level == label))
            })
            .collect();
        (codes, levels)
    }

    /// Compute basic statistics over present values of a numeric series
    pub fn describe(&self) -> Result<SeriesStats> {
        match self {
            Series::Float(_) => {
                let values = self.present_values()?;
                if values.is_empty() {
                    return Ok(SeriesStats::empty(self.len()));
                }

                let q25 = quantile(&values, 0.25).unwrap_or(f64::NAN);
                let q50 = quantile(&values, 0.5).unwrap_or(f64::NAN);
                let q75 = quantile(&values, 0.75).unwrap_or(f64::NAN);
                let arr = FloatArray::from(values);
                let mean = arr.mean().unwrap_or(f64::NAN);
                let std = if arr.len() > 1 { arr.std(1.0) } else { f64::NAN };
                let min = arr.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                let max = arr.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

                Ok(SeriesStats {
                    count: arr.len(),
                    missing: self.len() - arr.len(),
                    mean,
                    std,
                    min,
                    q25,
                    q50,
                    q75,
                    max,
                    unique_count: None,
                })
            }
            Series::String(_) => {
                let missing = self.missing_count();
                Ok(SeriesStats {
                    count: self.len() - missing,
                    unique_count: Some(self.unique_labels().len()),
                    ..SeriesStats::empty(missing)
                })
            }
        }
    }

    /// Compute mean of present numeric values
    pub fn mean(&self) -> Result<f64> {
        let values = self.present_values()?;
        if values.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Compute standard deviation of present numeric values
    pub fn std(&self, ddof: usize) -> Result<f64> {
        let values = self.present_values()?;
        if values.len() <= ddof {
            return Ok(f64::NAN);
        }
        Ok(FloatArray::from(values).std(ddof as f64))
    }
}

/// Statistical summary of a series
#[derive(Debug, Clone)]
pub struct SeriesStats {
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
    pub unique_count: Option<usize>,
}

impl SeriesStats {
    pub(crate) fn empty(missing: usize) -> Self {
        Self {
            count: 0,
            missing,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            q50: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
            unique_count: None,
        }
    }
}

/// Enum for type-safe value access
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Float(f64),
    String(String),
}

impl std::fmt::Display for SeriesValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesValue::Float(v) => write!(f, "{}", v),
            SeriesValue::String(v) => write!(f, "{}", v),
        }
    }
}
