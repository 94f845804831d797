pub mod api;
pub mod circuit;
pub mod facade;
pub mod sampler;
pub mod simulator;
pub mod state;

// Re-export key components for easier access from dependent crates.
pub use api::{MAX_QUBITS, SimError};
pub use circuit::{Circuit, Gate};
pub use facade::{run_counts, run_statevector};
pub use sampler::{Histogram, bitstring, sample_histogram};
pub use simulator::{QuantumSimulator, Simulator};
pub use state::StateVector;
