// tests/pipeline.rs

use qforecast::ansatz::{build_ansatz, readout};
use qforecast::encoder::{Encoder, EncodingConfig};
use qforecast::scorer::score;
use qforecast::{ForecastError, ForecastReport, Forecaster, ForecasterConfig, Pipeline};
use qsim::{Gate, Histogram, QuantumSimulator, SimError};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn seeded_config(seed: u64) -> ForecasterConfig {
    let mut config = ForecasterConfig {
        seed: Some(seed),
        ..Default::default()
    };
    config.training.max_iters = 20;
    config
}

#[test]
fn extreme_pipeline_is_reproducible_under_a_seed() {
    let run = || {
        let forecaster = Forecaster::new(seeded_config(42)).unwrap();
        let mut rng = forecaster.rng();
        match forecaster.run(Pipeline::ExtremeScore, &mut rng).unwrap() {
            ForecastReport::ExtremeScore(r) => r,
            other => panic!("unexpected report {:?}", other),
        }
    };
    let a = run();
    let b = run();
    assert_eq!(a.temperatures, b.temperatures);
    assert_eq!(a.histogram, b.histogram);
    assert_eq!(a.score, b.score);
    assert_eq!(a.histogram.counts.values().sum::<u32>(), 1000);
}

#[test]
fn fit_pipeline_is_reproducible_under_a_seed() {
    let run = || {
        let forecaster = Forecaster::new(seeded_config(7)).unwrap();
        let mut rng = forecaster.rng();
        match forecaster.run(Pipeline::VariationalFit, &mut rng).unwrap() {
            ForecastReport::VariationalFit(r) => r,
            other => panic!("unexpected report {:?}", other),
        }
    };
    let a = run();
    let b = run();
    assert_eq!(a.outcome.params, b.outcome.params);
    assert_eq!(a.outcome.cost, b.outcome.cost);
    assert!(a.outcome.cost >= 0.0);
}

#[test]
fn three_qubit_encoding_scenario() {
    // 0, 27.5 and 55 degrees above the -10 °C floor
    let enc = Encoder::new(3, EncodingConfig::default()).unwrap();
    let codes = enc.encode_series(&[-10.0, 17.5, 45.0]).unwrap();
    assert_eq!(codes, ["000", "011", "111"]);

    let circuit = enc.build_circuit(&codes).unwrap();
    assert!(circuit.gates[..3].iter().all(|g| matches!(g, Gate::H(_))));
    let flips: Vec<usize> = circuit
        .gates
        .iter()
        .filter_map(|g| match g {
            Gate::X(q) => Some(*q),
            _ => None,
        })
        .collect();
    assert_eq!(flips, [1, 2, 0, 1, 2]);
    assert_eq!(circuit.gates.last(), Some(&Gate::Measure));
}

#[test]
fn zero_ansatz_reads_out_one() {
    let circuit = build_ansatz(&[0.0; 6], 3).unwrap();
    let mut sim = QuantumSimulator::new(3).unwrap();
    assert_eq!(readout(sim.run(&circuit).unwrap()), 1.0);
}

#[test]
fn histogram_scenario_scores_point_four() {
    let hist: Histogram = [("000".to_string(), 600), ("111".to_string(), 400)]
        .into_iter()
        .collect();
    assert!((score(&hist).unwrap() - 0.4).abs() < 1e-12);
}

#[test]
fn zero_shots_fail_loudly() {
    let enc = Encoder::new(3, EncodingConfig::default()).unwrap();
    let circuit = enc.build_circuit(&[]).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        qsim::sample_histogram(&circuit, 0, &mut rng),
        Err(SimError::ZeroShots)
    );
    assert_eq!(
        score(&Histogram::new(3)),
        Err(ForecastError::Simulation(SimError::ZeroShots))
    );
}

#[test]
fn short_series_cannot_be_fitted() {
    let forecaster = Forecaster::new(seeded_config(1)).unwrap();
    let mut rng = forecaster.rng();
    assert_eq!(
        forecaster.fit(&[20.0; 9], &mut rng).unwrap_err(),
        ForecastError::InsufficientData { needed: 10, got: 9 }
    );
}
