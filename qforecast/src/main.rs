use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use qforecast::{Forecaster, ForecasterConfig, Pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Quantum-flavoured weather forecasts on a simulated register
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score the likelihood of extreme weather from 30 days of readings.
    Extreme {
        #[command(flatten)]
        common: CommonArgs,
        /// Measurement shots.
        #[arg(short, long)]
        shots: Option<u32>,
    },
    /// Fit the rotation ansatz to a simulated temperature series.
    Fit {
        #[command(flatten)]
        common: CommonArgs,
        /// Latitude used to shape the simulated series.
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long)]
        max_iters: Option<u64>,
        /// Give up and return the best point so far after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Generate raw station readings (temperature, pressure, humidity, wind).
    Readings {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,
        /// Number of rows to generate.
        #[arg(short = 'n', long)]
        samples: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// YAML configuration file. Flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    qubits: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// The output file to write JSON results to. If not provided, writes to stdout.
    #[arg(short, long)]
    output_file: Option<PathBuf>,
}

impl CommonArgs {
    fn load(&self) -> anyhow::Result<ForecasterConfig> {
        let mut config = match &self.config {
            Some(path) => ForecasterConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ForecasterConfig::default(),
        };
        if let Some(q) = self.qubits {
            config.qubit_count = q;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (pipeline, common, config) = match &cli.command {
        Command::Extreme { common, shots } => {
            let mut config = common.load()?;
            if let Some(shots) = shots {
                config.shots = *shots;
            }
            (Pipeline::ExtremeScore, common, config)
        }
        Command::Fit {
            common,
            latitude,
            max_iters,
            timeout_ms,
        } => {
            let mut config = common.load()?;
            if let Some(lat) = latitude {
                config.latitude = *lat;
            }
            if let Some(iters) = max_iters {
                config.training.max_iters = *iters;
            }
            if timeout_ms.is_some() {
                config.training.timeout_ms = *timeout_ms;
            }
            (Pipeline::VariationalFit, common, config)
        }
        Command::Readings {
            common,
            latitude,
            samples,
        } => {
            let mut config = common.load()?;
            if let Some(lat) = latitude {
                config.latitude = *lat;
            }
            if let Some(samples) = samples {
                config.station_samples = *samples;
            }
            (Pipeline::StationReadings, common, config)
        }
    };

    let forecaster = Forecaster::new(config).context("invalid configuration")?;
    info!(
        ?pipeline,
        qubits = forecaster.config().qubit_count,
        seed = ?forecaster.config().seed,
        "starting forecast"
    );
    let mut rng = forecaster.rng();
    let report = forecaster
        .run(pipeline, &mut rng)
        .context("forecast failed")?;

    let json_output =
        serde_json::to_string_pretty(&report).context("serializing forecast report")?;
    if let Some(output_path) = &common.output_file {
        let file = File::create(output_path)
            .with_context(|| format!("creating {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(json_output.as_bytes())?;
        writer.flush()?;
    } else {
        println!("{}", json_output);
    }
    Ok(())
}
