use qsim::{Circuit, QuantumSimulator, StateVector};

use crate::error::{ForecastError, Result};

/// Number of parameters the ansatz takes on `num_qubits` qubits.
pub fn num_parameters(num_qubits: usize) -> usize {
    2 * num_qubits
}

/// Builds the fixed-topology ansatz: RX(θ[i]) on every qubit, a CX chain
/// 0→1→…→n-1, then RY(θ[n + i]) on every qubit. No measurement is appended.
pub fn build_ansatz(params: &[f64], num_qubits: usize) -> Result<Circuit> {
    if params.len() != num_parameters(num_qubits) {
        return Err(ForecastError::ParamLength {
            expected: num_parameters(num_qubits),
            got: params.len(),
        });
    }

    let mut circuit = Circuit::new(num_qubits);
    for (i, &theta) in params[..num_qubits].iter().enumerate() {
        circuit.rx(i, theta);
    }
    for i in 0..num_qubits.saturating_sub(1) {
        circuit.cx(i, i + 1);
    }
    for (i, &theta) in params[num_qubits..].iter().enumerate() {
        circuit.ry(i, theta);
    }
    Ok(circuit)
}

/// The model output: real part of the |0…0⟩ amplitude.
pub fn readout(state: &StateVector) -> f64 {
    state.amplitudes[0].re
}

/// Runs the ansatz on `simulator` and reads the prediction off the final state.
pub fn predict(simulator: &mut QuantumSimulator, params: &[f64]) -> Result<f64> {
    let circuit = build_ansatz(params, simulator.num_qubits())?;
    Ok(readout(simulator.run(&circuit)?))
}
