// src/facade.rs
use rand::Rng;

use crate::StateVector;
use crate::api::SimError;
use crate::circuit::Circuit;
use crate::sampler::{Histogram, sample_histogram};
use crate::simulator::QuantumSimulator;

/// Final state of `circuit` on a fresh simulator sized to the circuit.
pub fn run_statevector(circuit: &Circuit) -> Result<StateVector, SimError> {
    let mut sim = QuantumSimulator::new(circuit.num_qubits)?;
    Ok(sim.run(circuit)?.clone())
}

/// Measurement histogram of `circuit` over `shots` samples.
pub fn run_counts(
    circuit: &Circuit,
    shots: u32,
    rng: &mut impl Rng,
) -> Result<Histogram, SimError> {
    sample_histogram(circuit, shots, rng)
}
