//! Variational fit of the ansatz readout to a normalised series.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use argmin::core::{CostFunction, Error, Executor, Gradient, State, TerminationReason};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use qsim::simulator::DEFAULT_NORM_TOLERANCE;
use qsim::{QuantumSimulator, SimError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::ansatz::{num_parameters, predict};
use crate::error::{ForecastError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainingConfig {
    pub max_iters: u64,
    /// L-BFGS memory length.
    pub history: usize,
    pub tolerance_grad: f64,
    pub tolerance_cost: f64,
    /// Forward-difference step for the gradient estimate.
    pub fd_step: f64,
    pub timeout_ms: Option<u64>,
    /// Allowed drift of the squared state norm after each gate.
    pub norm_tolerance: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            history: 10,
            tolerance_grad: 1e-5,
            tolerance_cost: 2.2e-9,
            fd_step: 1e-8,
            timeout_ms: None,
            norm_tolerance: DEFAULT_NORM_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingOutcome {
    pub params: Vec<f64>,
    pub cost: f64,
    /// Completed solver iterations. `None` when the solver was interrupted and
    /// did not report a count.
    pub iterations: Option<u64>,
    pub evaluations: u64,
    pub converged: bool,
    pub cancelled: bool,
    pub termination: String,
}

/// Shared flag a caller can set to stop a running fit at the next cost evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Min-max scales `values` into [0, 1]. A constant series maps to all zeros.
pub fn normalize_series(values: &[f64]) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ForecastError::InputRange {
            value: bad,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        });
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span == 0.0 {
        return Ok(vec![0.0; values.len()]);
    }
    Ok(values.iter().map(|v| (v - min) / span).collect())
}

fn mean_squared_error(prediction: f64, targets: &[f64]) -> f64 {
    targets.iter().map(|t| (prediction - t).powi(2)).sum::<f64>() / targets.len() as f64
}

struct Incumbent {
    params: Vec<f64>,
    cost: f64,
    evaluations: u64,
}

struct Guard {
    deadline: Option<Instant>,
    flag: Option<CancelFlag>,
}

impl Guard {
    fn tripped(&self) -> bool {
        self.flag.as_ref().is_some_and(|f| f.is_cancelled())
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

// Links the ansatz to the `argmin` solver. Every evaluation re-simulates the
// circuit; nothing is cached between candidate parameter vectors.
struct FitProblem<'a> {
    simulator: &'a RefCell<QuantumSimulator>,
    targets: &'a [f64],
    best: &'a RefCell<Incumbent>,
    guard: &'a Guard,
    fd_step: f64,
}

impl FitProblem<'_> {
    fn evaluate(&self, params: &[f64]) -> Result<f64> {
        let prediction = predict(&mut self.simulator.borrow_mut(), params)?;
        let cost = mean_squared_error(prediction, self.targets);

        let mut best = self.best.borrow_mut();
        best.evaluations += 1;
        if cost < best.cost {
            best.cost = cost;
            best.params = params.to_vec();
        }
        trace!(cost, prediction, "evaluated candidate");

        if self.guard.tripped() {
            return Err(ForecastError::Cancelled);
        }
        Ok(cost)
    }
}

impl CostFunction for FitProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, Error> {
        Ok(self.evaluate(params)?)
    }
}

impl Gradient for FitProblem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, params: &Self::Param) -> std::result::Result<Self::Gradient, Error> {
        let base = self.evaluate(params)?;
        let mut shifted = params.clone();
        let mut grad = Vec::with_capacity(params.len());
        for i in 0..params.len() {
            shifted[i] += self.fd_step;
            grad.push((self.evaluate(&shifted)? - base) / self.fd_step);
            shifted[i] = params[i];
        }
        Ok(grad)
    }
}

pub struct Trainer {
    num_qubits: usize,
    window: usize,
    config: TrainingConfig,
    cancel: Option<CancelFlag>,
}

impl Trainer {
    pub fn new(num_qubits: usize, window: usize, config: TrainingConfig) -> Result<Self> {
        qsim::api::check_register(num_qubits)?;
        if window == 0 {
            return Err(ForecastError::Config("training window must be positive".into()));
        }
        Ok(Self {
            num_qubits,
            window,
            config,
            cancel: None,
        })
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Normalises `series`, draws θ ~ N(0, 1) from `rng` and fits the ansatz
    /// readout to the first `window` points.
    pub fn fit(&self, series: &[f64], rng: &mut impl Rng) -> Result<TrainingOutcome> {
        if series.len() < self.window {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: series.len(),
            });
        }
        let normalized = normalize_series(series)?;
        let initial: Vec<f64> = (0..num_parameters(self.num_qubits))
            .map(|_| rng.sample(StandardNormal))
            .collect();
        self.fit_from(&normalized[..self.window], initial)
    }

    /// Minimises the mean squared error between the readout and `targets`,
    /// starting from `initial`.
    pub fn fit_from(&self, targets: &[f64], initial: Vec<f64>) -> Result<TrainingOutcome> {
        if targets.is_empty() {
            return Err(ForecastError::InsufficientData {
                needed: self.window,
                got: 0,
            });
        }
        if initial.len() != num_parameters(self.num_qubits) {
            return Err(ForecastError::ParamLength {
                expected: num_parameters(self.num_qubits),
                got: initial.len(),
            });
        }

        let simulator = RefCell::new(
            QuantumSimulator::new(self.num_qubits)?.with_norm_tolerance(self.config.norm_tolerance),
        );
        let best = RefCell::new(Incumbent {
            params: initial.clone(),
            cost: f64::INFINITY,
            evaluations: 0,
        });
        let guard = Guard {
            deadline: self
                .config
                .timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            flag: self.cancel.clone(),
        };
        let problem = FitProblem {
            simulator: &simulator,
            targets,
            best: &best,
            guard: &guard,
            fd_step: self.config.fd_step,
        };

        let solver = LBFGS::new(MoreThuenteLineSearch::new(), self.config.history)
            .with_tolerance_grad(self.config.tolerance_grad)
            .and_then(|s| s.with_tolerance_cost(self.config.tolerance_cost))
            .map_err(|e| ForecastError::Config(e.to_string()))?;

        info!(
            num_qubits = self.num_qubits,
            targets = targets.len(),
            max_iters = self.config.max_iters,
            "starting variational fit"
        );

        let result = Executor::new(problem, solver)
            .configure(|state| state.param(initial).max_iters(self.config.max_iters))
            .run();

        let outcome = match result {
            Ok(res) => {
                let state = res.state();
                let reason = state.get_termination_reason();
                let evaluations = best.borrow().evaluations;
                TrainingOutcome {
                    params: state
                        .get_best_param()
                        .cloned()
                        .unwrap_or_else(|| best.borrow().params.clone()),
                    cost: state.get_best_cost(),
                    iterations: Some(state.get_iter()),
                    evaluations,
                    converged: matches!(reason, Some(TerminationReason::SolverConverged)),
                    cancelled: false,
                    termination: reason.map_or_else(|| "NotTerminated".to_string(), |r| format!("{:?}", r)),
                }
            }
            Err(err) => {
                let cancelled = match err.downcast_ref::<ForecastError>() {
                    Some(ForecastError::Cancelled) => true,
                    Some(e @ ForecastError::Simulation(SimError::Instability { .. })) => {
                        return Err(e.clone());
                    }
                    _ => false,
                };
                warn!(error = %err, "optimizer stopped early, keeping best point found");
                let best = best.borrow();
                TrainingOutcome {
                    params: best.params.clone(),
                    cost: best.cost,
                    iterations: None,
                    evaluations: best.evaluations,
                    converged: false,
                    cancelled,
                    termination: err.to_string(),
                }
            }
        };

        info!(
            cost = outcome.cost,
            iterations = ?outcome.iterations,
            converged = outcome.converged,
            "variational fit finished"
        );
        debug!(params = ?outcome.params, "fitted parameters");
        Ok(outcome)
    }
}
