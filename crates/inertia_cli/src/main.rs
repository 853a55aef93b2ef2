//! Inertia CLI - replay scripted gestures against the scroll engine

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inertia_cli::{run_loaded_scenario, InertiaConfig, RunOptions, Scenario};
use inertia_scroll::FlickTiming;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inertia")]
#[command(author, version, about = "Inertial scroll simulator", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a gesture scenario and report the outcome
    Simulate {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Config file or directory containing inertia.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Platform flick timing, replacing the config's
        #[arg(long, value_enum)]
        preset: Option<Preset>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Include every published offset in the report
        #[arg(long)]
        trace: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Config file or directory containing inertia.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Platform flick timing, replacing the config's
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
}

/// Platform flick timing presets
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Desktop,
    Ios,
    Android,
}

impl Preset {
    fn timing(self) -> FlickTiming {
        match self {
            Preset::Desktop => FlickTiming::desktop(),
            Preset::Ios => FlickTiming::ios(),
            Preset::Android => FlickTiming::android(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            scenario,
            config,
            preset,
            report,
            trace,
        } => cmd_simulate(&scenario, config.as_deref(), preset, report.as_deref(), trace),
        Commands::Config { config, preset } => cmd_config(config.as_deref(), preset),
    }
}

fn load_config(path: Option<&Path>, preset: Option<Preset>) -> Result<InertiaConfig> {
    let config = match path {
        Some(path) => InertiaConfig::load(path)?,
        None => {
            let local = Path::new("inertia.toml");
            if local.exists() {
                InertiaConfig::load(local)?
            } else {
                InertiaConfig::default()
            }
        }
    };
    Ok(match preset {
        Some(preset) => config.with_timing(preset.timing()),
        None => config,
    })
}

fn cmd_simulate(
    scenario_path: &Path,
    config_path: Option<&Path>,
    preset: Option<Preset>,
    report_path: Option<&Path>,
    trace: bool,
) -> Result<()> {
    let config = load_config(config_path, preset)?;
    let scenario = Scenario::from_path(scenario_path)?;

    info!("Simulating {}", scenario_path.display());
    let outcome = run_loaded_scenario(&scenario, &config, RunOptions { trace });
    let report = outcome.report();

    match report_path {
        Some(path) => {
            report
                .write_to_path(path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => report.write_to_writer(&mut io::stdout().lock())?,
    }

    if outcome.is_failed() {
        let message = report.message.as_deref().unwrap_or("scenario failed");
        eprintln!(
            "step {} failed: {}",
            report.failed_step_index.unwrap_or_default(),
            message
        );
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_config(config_path: Option<&Path>, preset: Option<Preset>) -> Result<()> {
    let config = load_config(config_path, preset)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
