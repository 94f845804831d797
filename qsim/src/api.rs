// src/api.rs

/// Largest register the dense state vector is allowed to allocate.
pub const MAX_QUBITS: usize = 20;

/// A lightweight error enum so callers don't rely on simulator internals.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid qubit index: {0}")]
    Qubit(usize),
    #[error("CX control and target must differ (both {0})")]
    SameQubit(usize),
    #[error("Register size {0} outside 1..={}", MAX_QUBITS)]
    RegisterSize(usize),
    #[error("Gate at step {0} follows the terminal measurement")]
    AfterMeasure(usize),
    #[error("State norm drifted to {norm} after gate {step}")]
    Instability { step: usize, norm: f64 },
    #[error("Shot count must be positive")]
    ZeroShots,
    #[error("Circuit has no measurement to sample")]
    NoMeasurement,
    #[error("Internal error: {0}")]
    Internal(String),
}

pub fn check_register(num_qubits: usize) -> Result<(), SimError> {
    if num_qubits == 0 || num_qubits > MAX_QUBITS {
        return Err(SimError::RegisterSize(num_qubits));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_bounds() {
        assert_eq!(check_register(0), Err(SimError::RegisterSize(0)));
        assert!(check_register(1).is_ok());
        assert!(check_register(MAX_QUBITS).is_ok());
        assert_eq!(
            check_register(MAX_QUBITS + 1),
            Err(SimError::RegisterSize(MAX_QUBITS + 1))
        );
    }

    #[test]
    fn messages_name_the_problem() {
        let err = SimError::Instability { step: 3, norm: 1.5 };
        assert_eq!(err.to_string(), "State norm drifted to 1.5 after gate 3");
        assert_eq!(SimError::Qubit(9).to_string(), "Invalid qubit index: 9");
    }
}
