use super::circuit::{Circuit, Gate};
use super::state::StateVector;
use crate::api::{SimError, check_register};
use num_complex::Complex;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing::{debug, trace};

/// Allowed drift of the squared norm after a single gate before the run is abandoned.
pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-6;

pub trait Simulator {
    /// Resets the simulator to the |0...0⟩ state.
    fn reset(&mut self);
    /// Applies a single unitary gate to the state.
    fn apply_gate(&mut self, gate: &Gate) -> Result<(), SimError>;
    fn get_statevector(&self) -> &StateVector;
}

pub struct QuantumSimulator {
    pub num_qubits: usize,
    pub state: StateVector,
    norm_tolerance: f64,
    steps: usize,
}

impl Simulator for QuantumSimulator {
    fn reset(&mut self) {
        self.state.reset();
        self.steps = 0;
    }

    fn apply_gate(&mut self, gate: &Gate) -> Result<(), SimError> {
        self.validate(gate)?;
        match *gate {
            Gate::H(target) => self.state.apply_single_qubit_gate(&HADAMARD, target),
            Gate::X(target) => self.state.apply_single_qubit_gate(&PAULI_X, target),
            Gate::RX(target, theta) => self.state.apply_single_qubit_gate(&rx(theta), target),
            Gate::RY(target, theta) => self.state.apply_single_qubit_gate(&ry(theta), target),
            Gate::CX(control, target) => self.state.apply_cx(control, target),
            // Sampling is the caller's business; the state is left as-is.
            Gate::Measure => return Ok(()),
        }
        self.steps += 1;
        self.stabilize()
    }

    fn get_statevector(&self) -> &StateVector {
        &self.state
    }
}

impl QuantumSimulator {
    pub fn new(num_qubits: usize) -> Result<Self, SimError> {
        check_register(num_qubits)?;
        Ok(QuantumSimulator {
            num_qubits,
            state: StateVector::new(num_qubits),
            norm_tolerance: DEFAULT_NORM_TOLERANCE,
            steps: 0,
        })
    }

    pub fn with_norm_tolerance(mut self, tolerance: f64) -> Self {
        self.norm_tolerance = tolerance;
        self
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Evolves |0...0⟩ through every unitary gate of `circuit`, stopping at the
    /// terminal measurement, and returns the final state.
    pub fn run(&mut self, circuit: &Circuit) -> Result<&StateVector, SimError> {
        if circuit.num_qubits != self.num_qubits {
            check_register(circuit.num_qubits)?;
            self.num_qubits = circuit.num_qubits;
            self.state = StateVector::new(circuit.num_qubits);
        }
        self.reset();
        debug!(
            num_qubits = self.num_qubits,
            num_gates = circuit.len(),
            "running circuit"
        );

        let mut measured_at = None;
        for (step, gate) in circuit.gates.iter().enumerate() {
            if measured_at.is_some() {
                return Err(SimError::AfterMeasure(step));
            }
            if *gate == Gate::Measure {
                measured_at = Some(step);
                continue;
            }
            self.apply_gate(gate)?;
        }
        Ok(&self.state)
    }

    /// One Born-rule sample of the current state as a basis index. Does not collapse.
    pub fn shot(&self, rng: &mut impl Rng) -> Result<usize, SimError> {
        self.state.sample_index(rng)
    }

    pub fn get_probability(&self, state_index: usize) -> Result<f64, SimError> {
        self.state
            .amplitudes
            .get(state_index)
            .map(|amp| amp.norm_sqr())
            .ok_or_else(|| {
                SimError::Internal(format!("basis index {} out of range", state_index))
            })
    }

    fn validate(&self, gate: &Gate) -> Result<(), SimError> {
        for q in gate.targets() {
            if q >= self.num_qubits {
                return Err(SimError::Qubit(q));
            }
        }
        if let Gate::CX(control, target) = *gate {
            if control == target {
                return Err(SimError::SameQubit(control));
            }
        }
        Ok(())
    }

    fn stabilize(&mut self) -> Result<(), SimError> {
        let norm = self.state.norm_sqr();
        if !norm.is_finite() || (norm - 1.0).abs() > self.norm_tolerance {
            return Err(SimError::Instability {
                step: self.steps,
                norm,
            });
        }
        trace!(step = self.steps, drift = norm - 1.0, "renormalizing");
        self.state.renormalize();
        Ok(())
    }
}

// custom type for gate matrices
pub type GateMatrix = [[Complex<f64>; 2]; 2];

pub const HADAMARD: GateMatrix = [
    [
        Complex::new(FRAC_1_SQRT_2, 0.0),
        Complex::new(FRAC_1_SQRT_2, 0.0),
    ],
    [
        Complex::new(FRAC_1_SQRT_2, 0.0),
        Complex::new(-FRAC_1_SQRT_2, 0.0),
    ],
];

pub const PAULI_X: GateMatrix = [
    [Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)],
    [Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)],
];

/// Rx(θ) = cos(θ/2) I - i sin(θ/2) X
pub fn rx(theta: f64) -> GateMatrix {
    let (st, ct) = (theta * 0.5).sin_cos();
    [
        [Complex::new(ct, 0.0), Complex::new(0.0, -st)],
        [Complex::new(0.0, -st), Complex::new(ct, 0.0)],
    ]
}

/// Ry(θ) = cos(θ/2) I - i sin(θ/2) Y, which is real.
pub fn ry(theta: f64) -> GateMatrix {
    let (st, ct) = (theta * 0.5).sin_cos();
    [
        [Complex::new(ct, 0.0), Complex::new(-st, 0.0)],
        [Complex::new(st, 0.0), Complex::new(ct, 0.0)],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a.re - b.re).abs() < EPSILON && (a.im - b.im).abs() < EPSILON
    }

    #[test]
    fn test_bell_state_simulation() {
        let mut circuit = Circuit::new(2);
        circuit.h(0).cx(0, 1);
        let mut sim = QuantumSimulator::new(2).unwrap();
        let state = sim.run(&circuit).unwrap();

        let expected_amp = Complex::new(FRAC_1_SQRT_2, 0.0);
        assert!(approx_eq(state.amplitudes[0], expected_amp));
        assert!(approx_eq(state.amplitudes[1], Complex::new(0.0, 0.0)));
        assert!(approx_eq(state.amplitudes[2], Complex::new(0.0, 0.0)));
        assert!(approx_eq(state.amplitudes[3], expected_amp));
    }

    #[test]
    fn test_rotations_match_closed_form() {
        let mut sim = QuantumSimulator::new(1).unwrap();
        sim.apply_gate(&Gate::RX(0, PI)).unwrap();
        // RX(π)|0> = -i|1>
        assert!(approx_eq(sim.state.amplitudes[1], Complex::new(0.0, -1.0)));

        sim.reset();
        sim.apply_gate(&Gate::RY(0, PI / 2.0)).unwrap();
        assert!(approx_eq(sim.state.amplitudes[0], Complex::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sim.state.amplitudes[1], Complex::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_zero_angle_rotations_are_identity() {
        for m in [rx(0.0), ry(0.0)] {
            assert!(approx_eq(m[0][0], Complex::new(1.0, 0.0)));
            assert!(approx_eq(m[0][1], Complex::new(0.0, 0.0)));
            assert!(approx_eq(m[1][0], Complex::new(0.0, 0.0)));
            assert!(approx_eq(m[1][1], Complex::new(1.0, 0.0)));
        }
    }

    #[test]
    fn test_norm_is_preserved_gate_by_gate() {
        let gates = [
            Gate::H(0),
            Gate::RX(1, 0.3),
            Gate::CX(0, 2),
            Gate::RY(2, -1.7),
            Gate::X(1),
            Gate::CX(2, 1),
            Gate::RX(0, 12.5),
            Gate::H(2),
        ];
        let mut sim = QuantumSimulator::new(3).unwrap();
        for gate in &gates {
            sim.apply_gate(gate).unwrap();
            assert!((sim.get_statevector().norm_sqr() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_invalid_qubits_are_rejected() {
        let mut sim = QuantumSimulator::new(2).unwrap();
        assert_eq!(sim.apply_gate(&Gate::X(2)), Err(SimError::Qubit(2)));
        assert_eq!(sim.apply_gate(&Gate::CX(1, 1)), Err(SimError::SameQubit(1)));
        assert!(matches!(
            QuantumSimulator::new(0),
            Err(SimError::RegisterSize(0))
        ));
    }

    #[test]
    fn test_gate_after_measure_is_rejected() {
        let mut circuit = Circuit::new(1);
        circuit.h(0).measure_all().x(0);
        let mut sim = QuantumSimulator::new(1).unwrap();
        assert_eq!(sim.run(&circuit).unwrap_err(), SimError::AfterMeasure(2));
    }

    #[test]
    fn test_drifted_state_reports_instability() {
        let mut sim = QuantumSimulator::new(1).unwrap();
        sim.state.amplitudes[0] = Complex::new(1.5, 0.0);
        match sim.apply_gate(&Gate::X(0)) {
            Err(SimError::Instability { step, norm }) => {
                assert_eq!(step, 1);
                assert!((norm - 2.25).abs() < EPSILON);
            }
            other => panic!("expected instability, got {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let mut sim = QuantumSimulator::new(1).unwrap().with_norm_tolerance(1.5);
        sim.state.amplitudes[0] = Complex::new(1.5, 0.0);
        // 2.25 is within 1 + 1.5, so the state is rescaled instead of rejected
        sim.apply_gate(&Gate::X(0)).unwrap();
        assert!(approx_eq(sim.state.amplitudes[1], Complex::new(1.0, 0.0)));

        let mut strict = QuantumSimulator::new(1).unwrap().with_norm_tolerance(-1.0);
        assert!(matches!(
            strict.apply_gate(&Gate::H(0)),
            Err(SimError::Instability { step: 1, .. })
        ));
    }

    #[test]
    fn test_run_resizes_register() {
        let mut circuit = Circuit::new(3);
        circuit.x(2);
        let mut sim = QuantumSimulator::new(1).unwrap();
        let state = sim.run(&circuit).unwrap();
        assert_eq!(state.len(), 8);
        assert!(approx_eq(state.amplitudes[4], Complex::new(1.0, 0.0)));
        assert!((sim.get_probability(4).unwrap() - 1.0).abs() < EPSILON);
    }
}
