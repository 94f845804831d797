use qsim::{Histogram, run_counts};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ForecasterConfig;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::scorer::score;
use crate::trainer::{CancelFlag, Trainer, TrainingOutcome};
use crate::weather::{
    StationReadings, WeatherSeries, historical_temperatures, simulated_series, station_readings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    /// Binary encoding, repeated measurement, probability-weighted score.
    ExtremeScore,
    /// Rotation ansatz fitted to the normalised temperature series.
    VariationalFit,
    /// Raw station observations for the configured latitude, no model.
    StationReadings,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtremeReport {
    pub score: f64,
    pub temperatures: Vec<f64>,
    pub codes: Vec<String>,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    #[serde(flatten)]
    pub outcome: TrainingOutcome,
    pub weather: WeatherSeries,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "pipeline", rename_all = "snake_case")]
pub enum ForecastReport {
    ExtremeScore(ExtremeReport),
    VariationalFit(FitReport),
    StationReadings(StationReadings),
}

/// One forecaster per request. Holds no state between calls beyond its configuration.
pub struct Forecaster {
    config: ForecasterConfig,
    encoder: Encoder,
    cancel: Option<CancelFlag>,
}

impl Forecaster {
    pub fn new(config: ForecasterConfig) -> Result<Self> {
        config.validate()?;
        let encoder = Encoder::new(config.qubit_count, config.encoding)?;
        Ok(Self {
            config,
            encoder,
            cancel: None,
        })
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// Seeded generator when the configuration pins a seed, entropy otherwise.
    pub fn rng(&self) -> StdRng {
        self.config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }

    pub fn predict_extreme(&self, temperatures: &[f64], rng: &mut impl Rng) -> Result<ExtremeReport> {
        let codes = self.encoder.encode_series(temperatures)?;
        let circuit = self.encoder.build_circuit(&codes)?;
        debug!(rows = codes.len(), gates = circuit.len(), "encoded temperature series");

        let histogram = run_counts(&circuit, self.config.shots, rng)?;
        let score = score(&histogram)?;
        info!(score, shots = self.config.shots, "extreme weather score");
        Ok(ExtremeReport {
            score,
            temperatures: temperatures.to_vec(),
            codes,
            histogram,
        })
    }

    pub fn fit(&self, temperatures: &[f64], rng: &mut impl Rng) -> Result<TrainingOutcome> {
        let mut trainer = Trainer::new(
            self.config.qubit_count,
            self.config.window_days,
            self.config.training.clone(),
        )?;
        if let Some(flag) = &self.cancel {
            trainer = trainer.with_cancel_flag(flag.clone());
        }
        trainer.fit(temperatures, rng)
    }

    /// Generates input data for `pipeline` from `rng` and runs it.
    pub fn run(&self, pipeline: Pipeline, rng: &mut impl Rng) -> Result<ForecastReport> {
        match pipeline {
            Pipeline::ExtremeScore => {
                let temperatures = historical_temperatures(self.config.history_days, rng);
                Ok(ForecastReport::ExtremeScore(
                    self.predict_extreme(&temperatures, rng)?,
                ))
            }
            Pipeline::VariationalFit => {
                let weather = simulated_series(
                    self.config.latitude,
                    self.config.days_past,
                    self.config.days_future,
                    self.config.start,
                    rng,
                )?;
                let outcome = self.fit(&weather.temperature, rng)?;
                Ok(ForecastReport::VariationalFit(FitReport { outcome, weather }))
            }
            Pipeline::StationReadings => Ok(ForecastReport::StationReadings(station_readings(
                self.config.station_samples,
                self.config.latitude,
                rng,
            )?)),
        }
    }
}
