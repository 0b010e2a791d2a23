//! Design matrix construction
//!
//! Turns a filtered frame into the numeric matrix a regression consumes:
//!
//! ```text
//! (Intercept) | transformed continuous columns | drop-first dummies
//! ```
//!
//! Categorical columns are coerced to text labels, their observed levels
//! sorted, and the first level dropped as the reference.

use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::{DataFrame, FloatArray, Matrix, Series};
use crate::error::{CoreError, Result};
use crate::linalg;


/// Name given to the intercept column
pub const INTERCEPT: &str = "(Intercept)";

/// Transform applied to a continuous predictor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTransform {
    /// Natural logarithm
    #[default]
    Ln,
    /// `ln(1 + x)`
    Ln1p,
    /// Use the raw value
    Identity,
}

impl LogTransform {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            LogTransform::Ln => value.ln(),
            LogTransform::Ln1p => value.ln_1p(),
            LogTransform::Identity => value,
        }
    }

    /// Design column name for `column` under this transform
    pub fn column_name(self, column: &str) -> String {
        match self {
            LogTransform::Ln => format!("log_{}", column),
            LogTransform::Ln1p => format!("log1p_{}", column),
            LogTransform::Identity => column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousPredictor {
    pub column: String,
    #[serde(default)]
    pub transform: LogTransform,
}

impl ContinuousPredictor {
    pub fn new(column: impl Into<String>, transform: LogTransform) -> Self {
        Self {
            column: column.into(),
            transform,
        }
    }

    pub fn design_name(&self) -> String {
        self.transform.column_name(&self.column)
    }
}

/// Which columns enter the model, and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignMatrixSpec {
    /// Continuous predictors, in column order
    pub continuous: Vec<ContinuousPredictor>,
    /// Categorical predictors, one-hot encoded with the first level dropped
    pub categorical: Vec<String>,
    /// Response column
    pub target: String,
    /// Reject specs without any categorical predictor
    pub require_categorical: bool,
}

impl Default for DesignMatrixSpec {
    fn default() -> Self {
        Self {
            continuous: Vec::new(),
            categorical: Vec::new(),
            target: "price".to_string(),
            require_categorical: false,
        }
    }
}

impl DesignMatrixSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// `price ~ transform(odometer)`, the headline mileage model
    pub fn price_vs_mileage(transform: LogTransform) -> Self {
        Self::new().with_continuous("odometer", transform)
    }

    pub fn with_continuous(mut self, column: impl Into<String>, transform: LogTransform) -> Self {
        self.continuous
            .push(ContinuousPredictor::new(column, transform));
        self
    }

    pub fn with_categorical(mut self, column: impl Into<String>) -> Self {
        self.categorical.push(column.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn requiring_categorical(mut self) -> Self {
        self.require_categorical = true;
        self
    }

    fn check_predictors(&self) -> Result<()> {
        if self.continuous.is_empty() && self.categorical.is_empty() {
            return Err(CoreError::EmptyPredictorSet(
                "no continuous or categorical predictors",
            ));
        }
        if self.require_categorical && self.categorical.is_empty() {
            return Err(CoreError::EmptyPredictorSet(
                "at least one categorical predictor is required",
            ));
        }
        Ok(())
    }
}

/// Numeric design matrix with its response and provenance
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    /// `n x p` predictors, intercept first
    pub matrix: Matrix,
    /// Response values, one per matrix row
    pub target: FloatArray,
    /// Response column name
    pub target_name: String,
    /// Column labels, same order as the matrix columns
    pub column_names: Vec<String>,
    /// Row index in the source frame for every matrix row
    pub rows: Vec<usize>,
}

impl DesignMatrix {
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }
}

/// Encoded categorical column over the kept rows
struct Dummies {
    names: Vec<String>,
    codes: Vec<Option<usize>>,
}

pub struct DesignMatrixBuilder;

impl DesignMatrixBuilder {
    /// Build the design matrix for `spec` over the rows of `df`
    pub fn build(df: &DataFrame, spec: &DesignMatrixSpec) -> Result<DesignMatrix> {
        spec.check_predictors()?;

        let target = df.float_column(&spec.target)?;
        let continuous = spec
            .continuous
            .iter()
            .map(|p| {
                let values = df.float_column(&p.column)?;
                Ok(values.mapv(|v| p.transform.apply(v)))
            })
            .collect::<Result<Vec<Array1<f64>>>>()?;
        let categorical = spec
            .categorical
            .iter()
            .map(|c| Ok(df.column(c)?))
            .collect::<Result<Vec<&Series>>>()?;

        let rows: Vec<usize> = (0..df.nrows())
            .filter(|&i| {
                target[i].is_finite()
                    && continuous.iter().all(|values| values[i].is_finite())
                    && categorical.iter().all(|series| !series.is_missing(i))
            })
            .collect();

        if rows.len() < df.nrows() {
            debug!(
                "design: excluded {} of {} rows with missing target or predictors",
                df.nrows() - rows.len(),
                df.nrows()
            );
        }
        if rows.is_empty() {
            return Err(CoreError::EmptyFilterResult);
        }

        let mut dummies = Vec::with_capacity(categorical.len());
        for (name, series) in spec.categorical.iter().zip(&categorical) {
            let (codes, levels) = series.take(&rows)?.encode_levels();
            if levels.len() < 2 {
                debug!(
                    "design: '{}' has {} observed level(s), no dummy columns added",
                    name,
                    levels.len()
                );
                continue;
            }
            dummies.push(Dummies {
                names: levels[1..]
                    .iter()
                    .map(|level| format!("{}[{}]", name, level))
                    .collect(),
                codes,
            });
        }

        let mut column_names = vec![INTERCEPT.to_string()];
        column_names.extend(spec.continuous.iter().map(ContinuousPredictor::design_name));
        for d in &dummies {
            column_names.extend(d.names.iter().cloned());
        }

        let (n, p) = (rows.len(), column_names.len());
        let mut matrix = Array2::<f64>::zeros((n, p));
        for (r, &source) in rows.iter().enumerate() {
            matrix[(r, 0)] = 1.0;
            let mut col = 1;
            for values in &continuous {
                matrix[(r, col)] = values[source];
                col += 1;
            }
            for d in &dummies {
                // level 0 is the reference, level k maps to column offset k - 1
                if let Some(code) = d.codes[r].filter(|&code| code > 0) {
                    matrix[(r, col + code - 1)] = 1.0;
                }
                col += d.names.len();
            }
        }

        let rank = linalg::rank(&matrix)?;
        if rank < p {
            return Err(CoreError::SingularDesignMatrix { rank, columns: p });
        }

        let target: FloatArray = rows.iter().map(|&i| target[i]).collect();
        debug!("design: {} rows x {} columns {:?}", n, p, column_names);

        Ok(DesignMatrix {
            matrix,
            target,
            target_name: spec.target.clone(),
            column_names,
            rows,
        })
    }
}
