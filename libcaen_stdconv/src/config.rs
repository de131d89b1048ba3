use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ConfigError;
use super::waveform::Polarity;

/// Structure representing the converter configuration. Contains the waveform
/// analysis settings used to decide which pixels were hit.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Expected pulse polarity of the signals
    pub polarity: Polarity,
    /// Minimum peak amplitude over baseline (ADC units) for a pixel to count as hit
    pub hit_threshold_adcu: f64,
    /// Number of leading samples used to estimate the baseline
    pub pedestal_window: usize,
    /// Constant fraction of the peak amplitude used for the hit time
    pub cfd_fraction: f64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            polarity: Polarity::Negative,
            hit_threshold_adcu: 50.0,
            pedestal_window: 100,
            cfd_fraction: 0.2,
        }
    }
}

impl ConverterConfig {
    /// Read the configuration in a YAML file
    /// Returns a ConverterConfig if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }
}
