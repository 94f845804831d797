use std::collections::BTreeMap;

use rand::Rng;
use rand::distributions::Distribution;
use serde::Serialize;
use tracing::debug;

use crate::api::SimError;
use crate::circuit::Circuit;
use crate::simulator::QuantumSimulator;

/// Outcome counts keyed by bitstring. Keys are written most significant qubit
/// first, so the leftmost character is qubit `num_qubits - 1`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    pub num_qubits: usize,
    pub shots: u32,
    pub counts: BTreeMap<String, u32>,
}

impl Histogram {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            shots: 0,
            counts: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, basis_index: usize) {
        *self
            .counts
            .entry(bitstring(basis_index, self.num_qubits))
            .or_insert(0) += 1;
        self.shots += 1;
    }

    pub fn get(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

impl FromIterator<(String, u32)> for Histogram {
    /// Builds a histogram from raw counts; the register width is taken from the keys.
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let counts: BTreeMap<String, u32> = iter.into_iter().collect();
        let num_qubits = counts.keys().next().map_or(0, |k| k.len());
        let shots = counts.values().sum();
        Self {
            num_qubits,
            shots,
            counts,
        }
    }
}

pub fn bitstring(basis_index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", basis_index, width = num_qubits)
}

/// Evolves `circuit` once and draws `shots` independent samples from the final state.
pub fn sample_histogram(
    circuit: &Circuit,
    shots: u32,
    rng: &mut impl Rng,
) -> Result<Histogram, SimError> {
    if shots == 0 {
        return Err(SimError::ZeroShots);
    }
    if !circuit.has_measurement() {
        return Err(SimError::NoMeasurement);
    }

    let mut sim = QuantumSimulator::new(circuit.num_qubits)?;
    let dist = sim.run(circuit)?.distribution()?;

    let mut histogram = Histogram::new(circuit.num_qubits);
    for _ in 0..shots {
        histogram.record(dist.sample(rng));
    }
    debug!(
        shots,
        outcomes = histogram.counts.len(),
        "sampled measurement histogram"
    );
    Ok(histogram)
}
