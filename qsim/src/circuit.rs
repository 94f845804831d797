use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Gate {
    H(usize),
    X(usize),
    CX(usize, usize), // (control, target)
    RX(usize, f64),   // RX gate with angle
    RY(usize, f64),   // RY gate with angle
    /// Joint measurement of the whole register. Always the last operation.
    Measure,
}

impl Gate {
    /// Qubits the gate acts on, in (control, target) order for CX.
    pub fn targets(&self) -> Vec<usize> {
        match *self {
            Gate::H(q) | Gate::X(q) | Gate::RX(q, _) | Gate::RY(q, _) => vec![q],
            Gate::CX(c, t) => vec![c, t],
            Gate::Measure => Vec::new(),
        }
    }
}

/// An ordered gate list over a fixed-size register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circuit {
    pub num_qubits: usize,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    pub fn add_gate(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    pub fn h(&mut self, qubit: usize) -> &mut Self {
        self.add_gate(Gate::H(qubit));
        self
    }

    pub fn x(&mut self, qubit: usize) -> &mut Self {
        self.add_gate(Gate::X(qubit));
        self
    }

    pub fn cx(&mut self, control: usize, target: usize) -> &mut Self {
        self.add_gate(Gate::CX(control, target));
        self
    }

    pub fn rx(&mut self, qubit: usize, theta: f64) -> &mut Self {
        self.add_gate(Gate::RX(qubit, theta));
        self
    }

    pub fn ry(&mut self, qubit: usize, theta: f64) -> &mut Self {
        self.add_gate(Gate::RY(qubit, theta));
        self
    }

    pub fn measure_all(&mut self) -> &mut Self {
        self.add_gate(Gate::Measure);
        self
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn has_measurement(&self) -> bool {
        self.gates.contains(&Gate::Measure)
    }

    pub fn count_where(&self, pred: impl Fn(&Gate) -> bool) -> usize {
        self.gates.iter().filter(|g| pred(g)).count()
    }
}
