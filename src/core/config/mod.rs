//! Configuration types and management for nps-stats.
//!
//! Configuration is plain serde data: every section has a `Default`, any
//! section or field may be omitted from a YAML file, and `validate()` is the
//! single gate before a configuration reaches the engine.

pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{NpsError, Result};

pub use crate::core::distribution::FieldMap;
pub use crate::core::segmentation::SegmentationConfig;
pub use crate::io::csv_rows::CsvConfig;
pub use validation::{validate_field_name, validate_positive_f64};

/// Main configuration for the NPS engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpsConfig {
    /// Field names for response records and pre-tallied objects
    #[serde(default)]
    pub fields: FieldMap,

    /// CSV ingestion settings
    #[serde(default)]
    pub csv: CsvConfig,

    /// Control-limit settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,
}

impl NpsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            NpsError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            NpsError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.fields.validate().map_err(|e| {
            NpsError::config_field(format!("Invalid field mapping: {e}"), "fields")
        })?;
        self.csv.validate().map_err(|e| {
            NpsError::config_field(format!("Invalid CSV settings: {e}"), "csv")
        })?;
        self.segmentation.validate().map_err(|e| {
            NpsError::config_field(format!("Invalid segmentation settings: {e}"), "segmentation")
        })?;
        Ok(())
    }
}
