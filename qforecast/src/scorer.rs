use qsim::{Histogram, SimError};

use crate::error::{ForecastError, Result};

/// Inverse of [`crate::encoder::to_bitstring`].
pub fn decode_bitstring(key: &str, num_qubits: usize) -> Result<u32> {
    if key.len() != num_qubits || !key.chars().all(|c| c == '0' || c == '1') {
        return Err(ForecastError::Bitstring(key.to_string(), num_qubits));
    }
    u32::from_str_radix(key, 2).map_err(|_| ForecastError::Bitstring(key.to_string(), num_qubits))
}

/// Probability-weighted mean of the normalised outcomes:
/// Σ (count / R) · (value / (2^n - 1)). Always in [0, 1].
pub fn score(histogram: &Histogram) -> Result<f64> {
    let total: u32 = histogram.counts.values().sum();
    if total == 0 {
        return Err(SimError::ZeroShots.into());
    }
    let n = histogram.num_qubits;
    qsim::api::check_register(n)?;

    let max_level = ((1u32 << n) - 1) as f64;
    let mut weighted = 0.0;
    for (key, &count) in &histogram.counts {
        let value = decode_bitstring(key, n)? as f64 / max_level;
        weighted += (count as f64 / total as f64) * value;
    }
    Ok(weighted)
}
