use qsim::SimError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Temperature {value} outside encodable range [{min}, {max}]")]
    InputRange { value: f64, min: f64, max: f64 },
    #[error("Need at least {needed} data points, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimError),
    #[error("Malformed bitstring {0:?} for a {1}-qubit register")]
    Bitstring(String, usize),
    #[error("Parameter vector has length {got}, expected {expected}")]
    ParamLength { expected: usize, got: usize },
    #[error("Training cancelled")]
    Cancelled,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = ForecastError> = std::result::Result<T, E>;
