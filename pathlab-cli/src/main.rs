//! PathLab CLI — scenario runs, API serving, control catalog.
//!
//! Commands:
//! - `run` — simulate a scenario from a TOML file, print a summary, and
//!   optionally export the OHLC path as CSV
//! - `serve` — start the HTTP API
//! - `controls` — print the control catalog as JSON

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use pathlab_core::controls::{ControlCatalog, ControlSet};
use pathlab_core::domain::CompanyMeta;
use pathlab_core::events::{Event, EventValue};
use pathlab_core::predictor::PredictorKind;
use pathlab_core::sim::{Mode, SimulationRequest, SimulationResult, Simulator};
use pathlab_server::ApiServer;

#[derive(Parser)]
#[command(
    name = "pathlab",
    about = "PathLab CLI — scenario price-path simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a scenario from a TOML file.
    Run {
        /// Path to a TOML scenario file.
        #[arg(long)]
        scenario: PathBuf,

        /// Write the OHLC path to this CSV file.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the scenario's seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Start the HTTP API server.
    Serve {
        /// Listen address.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
    /// Print the control catalog (numeric ranges, categorical labels).
    Controls,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, output, seed } => run_scenario(&scenario, output.as_deref(), seed),
        Commands::Serve { addr } => serve(&addr).await,
        Commands::Controls => print_controls(),
    }
}

// ─── Scenario files ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    company: CompanySection,
    simulation: SimulationSection,
    #[serde(default)]
    controls: ControlSet,
    #[serde(default)]
    events: Vec<EventSection>,
}

#[derive(Debug, Deserialize)]
struct CompanySection {
    company_id: Option<String>,
    company_name: String,
    ticker: String,
    sector: String,
    market_cap_bucket: String,
    company_size: f64,
}

#[derive(Debug, Deserialize)]
struct SimulationSection {
    last_close: f64,
    /// YYYY-MM-DD
    start_date: String,
    horizon: Option<i64>,
    mode: Option<String>,
    base_vol: Option<f64>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EventSection {
    /// YYYY-MM-DD
    date: String,
    field: String,
    value: toml::Value,
}

fn build_request(file: ScenarioFile, seed_override: Option<u64>) -> Result<SimulationRequest> {
    let start_date = NaiveDate::parse_from_str(&file.simulation.start_date, "%Y-%m-%d")
        .with_context(|| format!("bad start_date '{}'", file.simulation.start_date))?;

    let mode = match file.simulation.mode.as_deref() {
        None | Some("trajectory") => Mode::Trajectory,
        Some("hold") => Mode::Hold,
        Some(other) => bail!("unknown mode '{other}'. Valid: hold, trajectory"),
    };

    let mut events = Vec::with_capacity(file.events.len());
    for section in file.events {
        let date = NaiveDate::parse_from_str(&section.date, "%Y-%m-%d")
            .with_context(|| format!("bad event date '{}'", section.date))?;
        let value = match section.value {
            toml::Value::Integer(i) => EventValue::Number(i as f64),
            toml::Value::Float(f) => EventValue::Number(f),
            toml::Value::String(s) => EventValue::Text(s),
            other => bail!(
                "event value for '{}' must be a number or string, got {other}",
                section.field
            ),
        };
        events.push(Event { date, field: section.field, value });
    }

    Ok(SimulationRequest {
        company_meta: Some(CompanyMeta {
            company_id: file.company.company_id,
            company_name: file.company.company_name,
            ticker: file.company.ticker,
            sector: file.company.sector,
            market_cap_bucket: file.company.market_cap_bucket,
            company_size: Some(file.company.company_size),
        }),
        last_close: Some(file.simulation.last_close),
        start_date: Some(start_date),
        horizon: file.simulation.horizon,
        mode,
        controls: file.controls,
        events,
        base_vol: file.simulation.base_vol,
        seed: seed_override.or(file.simulation.seed),
    })
}

fn run_scenario(path: &Path, output: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let file: ScenarioFile = toml::from_str(&raw)
        .with_context(|| format!("parsing scenario {}", path.display()))?;

    let request = build_request(file, seed)?;
    let simulator = Simulator::new();
    let result = simulator.simulate(&request)?;

    print_summary(&result);

    if let Some(out) = output {
        write_ohlc_csv(&result, out)?;
        println!("OHLC path saved to: {}", out.display());
    }

    Ok(())
}

fn write_ohlc_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for bar in &result.ohlc {
        writer.serialize(bar)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &SimulationResult) {
    let info = &result.info;
    let first = result.ohlc.first().expect("non-empty path");
    let last = result.ohlc.last().expect("non-empty path");
    let total_return = last.close / first.open - 1.0;

    println!();
    println!("=== Simulation Result ===");
    println!("Company:        {} ({})", info.company_name, info.ticker);
    println!("Sector:         {}", info.sector);
    println!("Period:         {} to {}", info.start_date, info.end_date);
    println!("Horizon:        {} trading days", info.horizon);
    println!("Mode:           {:?}", info.mode);
    println!("Base vol:       {:.4}", info.base_vol);
    match info.seed {
        Some(seed) => println!("Seed:           {seed}"),
        None => println!("Seed:           (entropy — not reproducible)"),
    }
    println!();
    println!("--- Path ---");
    println!("Start price:    {:.2}", first.open);
    println!("End price:      {:.2}", last.close);
    println!("Total return:   {:.2}%", total_return * 100.0);
    println!(
        "Events:         {} applied, {} skipped",
        info.events_applied, info.events_skipped
    );
    for unresolved in &result.unresolved_events {
        println!(
            "WARNING: event on {} ({}) outside the simulation period",
            unresolved.date, unresolved.field
        );
    }
    if info.predictor == PredictorKind::SyntheticFallback {
        println!();
        println!("WARNING: no trained model loaded — returns are SYNTHETIC");
    }
    println!();
}

// ─── Serve ───────────────────────────────────────────────────────────

async fn serve(addr: &str) -> Result<()> {
    // No model loading wired up yet: the API runs in documented synthetic
    // fallback mode and /health reports model_loaded = false.
    let simulator = Arc::new(Simulator::new());
    ApiServer::new(simulator).serve(addr).await
}

// ─── Controls ────────────────────────────────────────────────────────

fn print_controls() -> Result<()> {
    let catalog = ControlCatalog::new();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
