//! Configuration Layer Management
//!
//! Configuration is built in layers: defaults, then a configuration file
//! (explicit `--config` or an implicit `.nps.yml` in the working directory),
//! then command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::cli::args::ControlLimitArgs;
use nps_stats::{NpsConfig, SegmentationConfig};

/// File names picked up from the working directory when no `--config` is given
pub const IMPLICIT_CONFIG_FILES: [&str; 2] = [".nps.yml", ".nps.yaml"];

/// Apply command-line overrides onto a configuration layer
pub trait ApplyOverrides<T> {
    /// Overlay `overrides`, which take priority over the current values
    fn apply_overrides(&mut self, overrides: &T) -> anyhow::Result<()>;
}

impl ApplyOverrides<ControlLimitArgs> for NpsConfig {
    fn apply_overrides(&mut self, overrides: &ControlLimitArgs) -> anyhow::Result<()> {
        if let Some(level) = overrides.confidence {
            self.segmentation = SegmentationConfig::from_confidence_level(level)?;
            debug!(
                confidence = level,
                z_value = self.segmentation.z_value,
                "Using confidence level override"
            );
        }
        if let Some(z_value) = overrides.z {
            self.segmentation.z_value = z_value;
            debug!(z_value, "Using z value override");
        }
        Ok(())
    }
}

/// Look for an implicit configuration file in `dir`
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    IMPLICIT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load a configuration file. `.json` files are read as JSON, anything else as YAML.
pub fn load_configuration(path: &Path) -> anyhow::Result<NpsConfig> {
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?
        }
        _ => NpsConfig::from_yaml_file(path)?,
    };

    config.validate()?;
    Ok(config)
}

/// Build the effective configuration from every layer.
pub fn build_layered_config(
    config_path: Option<&Path>,
    overrides: &ControlLimitArgs,
) -> anyhow::Result<NpsConfig> {
    let file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_file(&std::env::current_dir()?),
    };

    let mut config = match file {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            load_configuration(&path)?
        }
        None => NpsConfig::default(),
    };

    config.apply_overrides(overrides)?;
    config.validate()?;
    Ok(config)
}
