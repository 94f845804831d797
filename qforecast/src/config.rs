use std::fs;
use std::path::Path;

use qsim::MAX_QUBITS;
use serde::{Deserialize, Serialize};

use crate::encoder::EncodingConfig;
use crate::error::{ForecastError, Result};
use crate::trainer::TrainingConfig;
use crate::weather::SeriesStart;

fn default_qubit_count() -> usize {
    3
}

fn default_shots() -> u32 {
    1000
}

fn default_window_days() -> usize {
    10
}

fn default_history_days() -> usize {
    30
}

fn default_days_past() -> usize {
    30
}

fn default_days_future() -> usize {
    14
}

fn default_station_samples() -> usize {
    10
}

/// Everything one forecaster instance needs. Every field has a default, so a
/// YAML file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecasterConfig {
    #[serde(default = "default_qubit_count")]
    pub qubit_count: usize,
    #[serde(default = "default_shots")]
    pub shots: u32,
    /// Leading normalised points the variational fit is scored against.
    #[serde(default = "default_window_days")]
    pub window_days: usize,
    /// Daily readings fed to the extreme-weather score.
    #[serde(default = "default_history_days")]
    pub history_days: usize,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default = "default_days_past")]
    pub days_past: usize,
    #[serde(default = "default_days_future")]
    pub days_future: usize,
    /// Rows produced by the station-readings pipeline.
    #[serde(default = "default_station_samples")]
    pub station_samples: usize,
    #[serde(default)]
    pub start: SeriesStart,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            qubit_count: default_qubit_count(),
            shots: default_shots(),
            window_days: default_window_days(),
            history_days: default_history_days(),
            latitude: 0.0,
            days_past: default_days_past(),
            days_future: default_days_future(),
            station_samples: default_station_samples(),
            start: SeriesStart::default(),
            encoding: EncodingConfig::default(),
            training: TrainingConfig::default(),
            seed: None,
        }
    }
}

impl ForecasterConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| ForecastError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.qubit_count == 0 || self.qubit_count > MAX_QUBITS {
            return Err(ForecastError::Config(format!(
                "qubitCount must be in 1..={}, got {}",
                MAX_QUBITS, self.qubit_count
            )));
        }
        if self.shots == 0 {
            return Err(ForecastError::Config("shots must be positive".into()));
        }
        if self.window_days == 0 {
            return Err(ForecastError::Config("windowDays must be positive".into()));
        }
        let tolerance = self.training.norm_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ForecastError::Config(format!(
                "training.normTolerance must be positive, got {}",
                tolerance
            )));
        }
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(ForecastError::Config(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        Ok(())
    }
}
