//! Configuration for loading and modeling listing data

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::design::LogTransform;
use crate::error::{CoreError, Result};

/// How a listing file is turned into a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Columns that must be present after renaming
    pub required_columns: Vec<String>,
    /// Columns parsed permissively as numbers; all others load as text
    pub numeric_columns: Vec<String>,
    /// Column renames applied before anything else (e.g. reserved words)
    pub renames: IndexMap<String, String>,
    /// Target column; rows missing it or with a non-positive value are dropped
    pub price_column: String,
    /// Mileage column; rows missing it or with a non-positive value are dropped
    pub odometer_column: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let mut renames = IndexMap::new();
        renames.insert("type".to_string(), "vehicle_type".to_string());

        Self {
            required_columns: ["make", "model", "year", "odometer", "price"]
                .map(String::from)
                .to_vec(),
            numeric_columns: ["price", "odometer", "year", "latitude", "longitude"]
                .map(String::from)
                .to_vec(),
            renames,
            price_column: "price".to_string(),
            odometer_column: "odometer".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }

    /// Name a raw header ends up with after renaming
    pub fn renamed<'a>(&'a self, column: &'a str) -> &'a str {
        self.renames.get(column).map_or(column, String::as_str)
    }
}

/// Settings shared by the filter-and-fit pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub loader: LoaderConfig,
    /// Transform applied to the odometer predictor
    pub transform: LogTransform,
    /// Confidence level for coefficient intervals
    pub confidence_level: f64,
    /// Significance level used to flag coefficients
    pub significance_level: f64,
    /// Column holding latitude, for residual maps
    pub latitude_column: String,
    /// Column holding longitude, for residual maps
    pub longitude_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            transform: LogTransform::default(),
            confidence_level: 0.95,
            significance_level: 0.05,
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, level) in [
            ("confidence_level", self.confidence_level),
            ("significance_level", self.significance_level),
        ] {
            if !(level > 0.0 && level < 1.0) {
                return Err(CoreError::Config(format!(
                    "{} must be in (0, 1), got {}",
                    name, level
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.loader.renamed("type"), "vehicle_type");
        assert_eq!(config.loader.renamed("make"), "make");
        assert!(config.loader.is_numeric("odometer"));
        assert!(!config.loader.is_numeric("cylinders"));
        assert_eq!(config.transform, LogTransform::Ln);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "transform": "ln1p", "loader": { "price_column": "asking_price" } }"#,
        )
        .unwrap();

        assert_eq!(config.transform, LogTransform::Ln1p);
        assert_eq!(config.loader.price_column, "asking_price");
        assert_eq!(config.loader.odometer_column, "odometer");
        assert_eq!(config.confidence_level, 0.95);
    }

    #[test]
    fn test_invalid_levels_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "confidence_level": 1.5 }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.is_fatal());
    }
}
