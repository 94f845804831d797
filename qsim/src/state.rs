use num_complex::Complex;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Serialize;

use crate::api::SimError;

/// Amplitudes of an `num_qubits` register. Qubit `i` is bit `i` of the
/// basis index, so index `0b011` on three qubits means q0 = 1, q1 = 1, q2 = 0.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct StateVector {
    pub num_qubits: usize,
    #[serde(rename = "amplitudes")]
    pub amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits; // 2^num_qubits
        let mut amplitudes = vec![Complex::new(0.0, 0.0); size];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Applies `gate_matrix` to `target_qubit`, identity on every other qubit.
    pub fn apply_single_qubit_gate(
        &mut self,
        gate_matrix: &[[Complex<f64>; 2]; 2],
        target_qubit: usize,
    ) {
        let k = 1 << target_qubit;

        for i in 0..self.amplitudes.len() {
            if (i & k) == 0 {
                let j = i | k;
                let amp_i = self.amplitudes[i];
                let amp_j = self.amplitudes[j];

                self.amplitudes[i] = gate_matrix[0][0] * amp_i + gate_matrix[0][1] * amp_j;
                self.amplitudes[j] = gate_matrix[1][0] * amp_i + gate_matrix[1][1] * amp_j;
            }
        }
    }

    /// Controlled-NOT: swaps the target bit of every basis state whose control bit is set.
    pub fn apply_cx(&mut self, control_qubit: usize, target_qubit: usize) {
        let control_mask = 1 << control_qubit;
        let target_mask = 1 << target_qubit;

        for i in 0..self.amplitudes.len() {
            if (i & control_mask) != 0 && (i & target_mask) == 0 {
                self.amplitudes.swap(i, i | target_mask);
            }
        }
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn renormalize(&mut self) {
        let norm = self.norm_sqr().sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Born-rule sampler over basis indices. The state itself is left untouched,
    /// so the same distribution can be drawn from repeatedly.
    pub fn distribution(&self) -> Result<WeightedIndex<f64>, SimError> {
        WeightedIndex::new(self.probabilities()).map_err(|e| SimError::Internal(e.to_string()))
    }

    pub fn sample_index(&self, rng: &mut impl Rng) -> Result<usize, SimError> {
        Ok(self.distribution()?.sample(rng))
    }

    pub fn reset(&mut self) {
        for amp in &mut self.amplitudes {
            *amp = Complex::new(0.0, 0.0);
        }
        self.amplitudes[0] = Complex::new(1.0, 0.0);
    }
}
