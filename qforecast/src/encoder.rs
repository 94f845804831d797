//! Temperature series to measurement circuit.
//!
//! Each reading is normalised against a fixed physical range, truncated to an
//! `n`-bit level and written as a zero-padded bitstring. The circuit puts every
//! qubit into superposition and then, for every row of the batch, flips qubit
//! `j` wherever character `j` of that row's code is `'1'`. Rows share one
//! register: flips from successive rows accumulate rather than reset.

use qsim::Circuit;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 45.0,
        }
    }
}

impl TemperatureRange {
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }
}

/// What to do with a reading that normalises outside [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Pin to the nearest edge of the range.
    #[default]
    Clamp,
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub range: TemperatureRange,
    pub policy: RangePolicy,
}

#[derive(Debug, Clone)]
pub struct Encoder {
    num_qubits: usize,
    config: EncodingConfig,
}

impl Encoder {
    pub fn new(num_qubits: usize, config: EncodingConfig) -> Result<Self> {
        qsim::api::check_register(num_qubits)?;
        if !(config.range.max > config.range.min) {
            return Err(ForecastError::Config(format!(
                "temperature range [{}, {}] is empty",
                config.range.min, config.range.max
            )));
        }
        Ok(Self { num_qubits, config })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Highest level an `n`-bit code can hold, 2^n - 1.
    pub fn max_level(&self) -> u32 {
        (1u32 << self.num_qubits) - 1
    }

    pub fn encode_level(&self, value: f64) -> Result<u32> {
        let range = self.config.range;
        let out_of_range = ForecastError::InputRange {
            value,
            min: range.min,
            max: range.max,
        };
        if !value.is_finite() {
            return Err(out_of_range);
        }

        let mut norm = range.normalize(value);
        if !(0.0..=1.0).contains(&norm) {
            match self.config.policy {
                RangePolicy::Clamp => norm = norm.clamp(0.0, 1.0),
                RangePolicy::Reject => return Err(out_of_range),
            }
        }
        // Truncation toward zero, not rounding.
        Ok((norm * self.max_level() as f64) as u32)
    }

    pub fn encode(&self, value: f64) -> Result<String> {
        Ok(to_bitstring(self.encode_level(value)?, self.num_qubits))
    }

    pub fn encode_series(&self, values: &[f64]) -> Result<Vec<String>> {
        values.iter().map(|&v| self.encode(v)).collect()
    }

    pub fn build_circuit(&self, codes: &[String]) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.num_qubits);
        for q in 0..self.num_qubits {
            circuit.h(q);
        }
        for code in codes {
            if code.len() != self.num_qubits {
                return Err(ForecastError::Bitstring(code.clone(), self.num_qubits));
            }
            for (j, bit) in code.chars().enumerate() {
                match bit {
                    '1' => {
                        circuit.x(j);
                    }
                    '0' => {}
                    _ => return Err(ForecastError::Bitstring(code.clone(), self.num_qubits)),
                }
            }
        }
        circuit.measure_all();
        Ok(circuit)
    }
}

pub fn to_bitstring(level: u32, num_qubits: usize) -> String {
    format!("{:0width$b}", level, width = num_qubits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim::Gate;

    fn encoder(n: usize) -> Encoder {
        Encoder::new(n, EncodingConfig::default()).unwrap()
    }

    #[test]
    fn range_edges_map_to_extreme_codes() {
        let enc = encoder(3);
        let codes = enc.encode_series(&[-10.0, 17.5, 45.0]).unwrap();
        assert_eq!(codes, vec!["000", "011", "111"]);
    }

    #[test]
    fn in_range_readings_truncate() {
        let enc = encoder(3);
        // 0°C -> 10/55 * 7 = 1.27, 27.5°C -> 37.5/55 * 7 = 4.77
        assert_eq!(enc.encode(0.0).unwrap(), "001");
        assert_eq!(enc.encode(27.5).unwrap(), "100");
    }

    #[test]
    fn out_of_range_clamps_by_default() {
        let enc = encoder(3);
        assert_eq!(enc.encode(55.0).unwrap(), "111");
        assert_eq!(enc.encode(-40.0).unwrap(), "000");
    }

    #[test]
    fn out_of_range_rejected_when_asked() {
        let enc = Encoder::new(
            3,
            EncodingConfig {
                policy: RangePolicy::Reject,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            enc.encode(55.0),
            Err(ForecastError::InputRange {
                value: 55.0,
                min: -10.0,
                max: 45.0
            })
        );
        assert_eq!(enc.encode(45.0).unwrap(), "111");
    }

    #[test]
    fn non_finite_always_rejected() {
        let enc = encoder(4);
        assert!(matches!(
            enc.encode(f64::NAN),
            Err(ForecastError::InputRange { .. })
        ));
        assert!(matches!(
            enc.encode(f64::INFINITY),
            Err(ForecastError::InputRange { .. })
        ));
    }

    #[test]
    fn level_round_trips_through_bitstring() {
        for n in 1..=4 {
            let enc = encoder(n);
            let max = enc.max_level() as f64;
            let mut v = -10.0;
            while v <= 45.0 {
                let norm = enc.config.range.normalize(v);
                let code = enc.encode(v).unwrap();
                let level = u32::from_str_radix(&code, 2).unwrap();
                assert!(level <= enc.max_level());
                let decoded = level as f64 / max;
                // decoded value sits in the bucket the normalised reading fell into
                assert!(decoded <= norm + 1e-12, "v={} code={}", v, code);
                assert!(norm < (level as f64 + 1.0) / max + 1e-12, "v={} code={}", v, code);
                v += 0.25;
            }
        }
    }

    #[test]
    fn circuit_has_hadamards_then_accumulated_flips() {
        let enc = encoder(3);
        let codes = enc.encode_series(&[-10.0, 17.5, 45.0]).unwrap();
        let circuit = enc.build_circuit(&codes).unwrap();

        let expected = vec![
            Gate::H(0),
            Gate::H(1),
            Gate::H(2),
            // "011"
            Gate::X(1),
            Gate::X(2),
            // "111"
            Gate::X(0),
            Gate::X(1),
            Gate::X(2),
            Gate::Measure,
        ];
        assert_eq!(circuit.gates, expected);
        assert_eq!(circuit.count_where(|g| matches!(g, Gate::H(_))), 3);
    }

    #[test]
    fn malformed_codes_are_rejected() {
        let enc = encoder(3);
        assert_eq!(
            enc.build_circuit(&["01".to_string()]),
            Err(ForecastError::Bitstring("01".to_string(), 3))
        );
        assert_eq!(
            enc.build_circuit(&["0a1".to_string()]),
            Err(ForecastError::Bitstring("0a1".to_string(), 3))
        );
    }

    #[test]
    fn empty_range_is_a_config_error() {
        let cfg = EncodingConfig {
            range: TemperatureRange { min: 5.0, max: 5.0 },
            ..Default::default()
        };
        assert!(matches!(
            Encoder::new(3, cfg),
            Err(ForecastError::Config(_))
        ));
    }
}
