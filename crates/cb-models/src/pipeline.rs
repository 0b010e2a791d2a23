//! Filter-and-fit sessions over a loaded listing dataset
//!
//! A [`Session`] owns the cleaned dataset behind an `Arc` and answers
//! independent requests against it:
//!
//! ```text
//! FilterRequest ─► FilterEngine ─► DesignMatrixBuilder ─► OlsFitter ─► FitReport
//! ```
//!
//! Requests never mutate the dataset, so clones of a session can serve
//! requests from several threads at once.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cb_core::config::PipelineConfig;
use cb_core::data::{pearson, DataError, DataFrame};
use cb_core::design::{DesignMatrix, DesignMatrixBuilder, DesignMatrixSpec, LogTransform};
use cb_core::filter::{FilterEngine, FilterSpec, OutlierPolicy};
use cb_core::{loader, CoreError};

use crate::base::{Coefficient, ModelError};
use crate::lm::{FitConfig, OlsFitter, RegressionResult};


/// Errors surfaced by a session request
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PipelineError {
    /// Whether the session itself is unusable, as opposed to one request
    pub fn is_fatal(&self) -> bool {
        match self {
            PipelineError::Core(e) => e.is_fatal(),
            PipelineError::Model(ModelError::InvalidConfig { .. }) => true,
            PipelineError::Model(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Which rows a request works on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    pub spec: FilterSpec,
    pub outlier: OutlierPolicy,
}

impl FilterRequest {
    pub fn new(spec: FilterSpec, outlier: OutlierPolicy) -> Self {
        Self { spec, outlier }
    }
}

/// Residual of one listing, placed on the map by its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualPoint {
    /// Row index in the filtered frame
    pub row: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub predicted: f64,
    pub residual: f64,
}

/// Outcome of one filter-and-fit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    /// Rows left after filtering, before rows with missing predictors are dropped
    pub filtered_rows: usize,
    pub result: RegressionResult,
    /// Empty when the dataset has no coordinate columns
    pub residual_points: Vec<ResidualPoint>,
}

/// Price against mileage for the current selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MileageReport {
    pub fit: FitReport,
    /// Pearson correlation of transformed mileage and price
    pub correlation: Option<f64>,
    pub slope: Coefficient,
    /// Slope p-value below the configured significance level
    pub significant: bool,
    /// Price change for a 1% increase in mileage; only for log transforms
    pub percent_change_effect: Option<f64>,
}

/// Shared read-only dataset plus the settings requests run with
#[derive(Debug, Clone)]
pub struct Session {
    data: Arc<DataFrame>,
    config: PipelineConfig,
    fitter: OlsFitter,
}

impl Session {
    /// Load the listing file at `path` once for all later requests
    pub fn open(path: impl AsRef<Path>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let data = loader::load(path, &config.loader)?;
        Self::from_frame(data, config)
    }

    /// Wrap an already cleaned frame
    pub fn from_frame(data: DataFrame, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let fitter = OlsFitter::with_config(FitConfig {
            confidence_level: config.confidence_level,
        })?;
        info!(
            "session ready: {} listings, {} columns",
            data.nrows(),
            data.ncols()
        );
        Ok(Self {
            data: Arc::new(data),
            config,
            fitter,
        })
    }

    pub fn data(&self) -> &Arc<DataFrame> {
        &self.data
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Rows matching `request`
    pub fn filter(&self, request: &FilterRequest) -> Result<DataFrame> {
        Ok(FilterEngine::apply(
            &self.data,
            &request.spec,
            &request.outlier,
        )?)
    }

    /// Options for cascading selectors, see [`FilterEngine::facet_options`]
    pub fn facet_options<S: AsRef<str>>(
        &self,
        spec: &FilterSpec,
        columns: &[S],
    ) -> Result<IndexMap<String, Vec<String>>> {
        Ok(FilterEngine::facet_options(&self.data, spec, columns)?)
    }

    /// Filter, build the design matrix and fit OLS
    pub fn fit(&self, request: &FilterRequest, spec: &DesignMatrixSpec) -> Result<FitReport> {
        self.run(request, spec).map(|(report, _)| report)
    }

    /// `price ~ transform(odometer)` over the selection
    pub fn price_vs_mileage(&self, request: &FilterRequest) -> Result<MileageReport> {
        let transform = self.config.transform;
        let odometer = &self.config.loader.odometer_column;
        let spec = DesignMatrixSpec::new()
            .with_target(self.config.loader.price_column.clone())
            .with_continuous(odometer.clone(), transform);

        let (fit, design) = self.run(request, &spec)?;
        let slope_name = transform.column_name(odometer);
        let slope = fit
            .result
            .coefficient(&slope_name)
            .cloned()
            .ok_or_else(|| CoreError::from(DataError::ColumnNotFound(slope_name.clone())))?;

        let correlation = design.column_index(&slope_name).and_then(|j| {
            let x = design.matrix.column(j).to_vec();
            pearson(&x, &design.target.to_vec())
        });
        let percent_change_effect = match transform {
            LogTransform::Identity => None,
            _ => fit.result.percent_change_effect(&slope_name),
        };
        let significant = slope.is_significant(self.config.significance_level);

        debug!(
            "mileage: slope={:.2} r={:?} significant={}",
            slope.estimate, correlation, significant
        );

        Ok(MileageReport {
            fit,
            correlation,
            slope,
            significant,
            percent_change_effect,
        })
    }

    fn run(
        &self,
        request: &FilterRequest,
        spec: &DesignMatrixSpec,
    ) -> Result<(FitReport, DesignMatrix)> {
        let filtered = self.filter(request)?;
        let design = DesignMatrixBuilder::build(&filtered, spec)?;
        let result = self.fitter.fit(&design)?;
        let residual_points = self.residual_points(&filtered, &design, &result);

        info!(
            "fit {}: {} filtered rows, {} used, R² = {:.4}",
            result.formula(),
            filtered.nrows(),
            design.nrows(),
            result.r_squared()
        );

        let report = FitReport {
            filtered_rows: filtered.nrows(),
            result,
            residual_points,
        };
        Ok((report, design))
    }

    fn residual_points(
        &self,
        filtered: &DataFrame,
        design: &DesignMatrix,
        result: &RegressionResult,
    ) -> Vec<ResidualPoint> {
        let (Ok(latitude), Ok(longitude)) = (
            filtered.float_column(&self.config.latitude_column),
            filtered.float_column(&self.config.longitude_column),
        ) else {
            debug!("no coordinate columns, skipping residual map");
            return Vec::new();
        };

        design
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, &row)| {
                let (lat, lon) = (latitude[row], longitude[row]);
                if lat.is_nan() || lon.is_nan() {
                    return None;
                }
                Some(ResidualPoint {
                    row,
                    latitude: lat,
                    longitude: lon,
                    price: result.actual[i],
                    predicted: result.fitted_values[i],
                    residual: result.residuals[i],
                })
            })
            .collect()
    }
}
