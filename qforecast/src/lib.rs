//! Toy weather forecasting on a simulated qubit register.
//!
//! Two pipelines share the [`qsim`] substrate: the extreme-weather score
//! ([`encoder`] + sampling + [`scorer`]) and the variational fit
//! ([`ansatz`] + [`trainer`]). [`Forecaster`] picks between them.

pub mod ansatz;
pub mod config;
pub mod encoder;
pub mod error;
pub mod forecaster;
pub mod scorer;
pub mod trainer;
pub mod weather;

pub use config::ForecasterConfig;
pub use error::{ForecastError, Result};
pub use forecaster::{ForecastReport, Forecaster, Pipeline};
pub use trainer::{CancelFlag, TrainingConfig, TrainingOutcome};
