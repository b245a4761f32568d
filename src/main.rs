//! Waterfall System CLI
//!
//! Runs the projected and valuation scenarios for a portfolio file (or the
//! built-in sample portfolio) and prints summary tables, JSON or CSV exports

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;
use waterfall_system::portfolio::{load_portfolio, Portfolio};
use waterfall_system::report::{render_summary, write_scenario_csvs};
use waterfall_system::{CalculationOutput, ProjectionConfig, ScenarioRunner};

/// Deal-by-deal LP/GP distribution waterfall
#[derive(Parser)]
#[command(name = "waterfall", version, about = "Deal-by-deal LP/GP distribution waterfall")]
struct Cli {
    /// Portfolio JSON file (defaults to the built-in sample portfolio)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Which scenario to report
    #[arg(long, value_enum, default_value = "both")]
    scenario: ScenarioChoice,

    /// Print the full results as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write CSV exports into this directory
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Starting guess for the IRR solver, as a decimal rate
    #[arg(long)]
    irr_guess: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScenarioChoice {
    Projected,
    Valuation,
    Both,
}

impl ScenarioChoice {
    fn includes_projected(self) -> bool {
        matches!(self, ScenarioChoice::Projected | ScenarioChoice::Both)
    }

    fn includes_valuation(self) -> bool {
        matches!(self, ScenarioChoice::Valuation | ScenarioChoice::Both)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let portfolio = match &cli.input {
        Some(path) => load_portfolio(path)
            .with_context(|| format!("failed to load portfolio from {}", path.display()))?,
        None => {
            info!("No --input given, using the sample portfolio");
            Portfolio::sample()
        }
    };

    let mut config = ProjectionConfig::default();
    if let Some(guess) = cli.irr_guess {
        config.irr.initial_guess = guess;
    }
    let runner = ScenarioRunner::with_config(config);
    info!("IRR solver starting guess {}", runner.config().irr.initial_guess);

    let (projections, warnings) = runner.try_project(&portfolio).context("portfolio failed validation")?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    if cli.json {
        let json = match cli.scenario {
            ScenarioChoice::Both => serde_json::to_string_pretty(&projections)?,
            ScenarioChoice::Projected => serde_json::to_string_pretty(&projections.projected)?,
            ScenarioChoice::Valuation => serde_json::to_string_pretty(&projections.valuation)?,
        };
        println!("{}", json);
    } else {
        println!("Waterfall System v{}", env!("CARGO_PKG_VERSION"));
        println!("========================\n");

        if portfolio.investors.is_empty() {
            println!("No investors in portfolio; add investors to see results.");
            return Ok(());
        }
        if portfolio.active_deals().is_empty() {
            println!("No active deals in portfolio; activate a deal to see results.");
            return Ok(());
        }

        for (label, output) in selected(&cli, &projections.projected, &projections.valuation) {
            println!("{}", render_summary(label, output)?);
        }

        println!("Cumulative LP distributions:");
        println!("{:>4} {:>16} {:>16}", "Year", "Projected", "Valuation");
        for point in &projections.cumulative_return_chart_data {
            let valuation = point
                .valuation
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string());
            println!("{:>4} {:>16.2} {:>16}", point.year, point.projected, valuation);
        }
    }

    if let Some(dir) = &cli.csv_dir {
        for (label, output) in selected(&cli, &projections.projected, &projections.valuation) {
            let files = write_scenario_csvs(output, dir, &label.to_lowercase())
                .with_context(|| format!("failed to write CSV files to {}", dir.display()))?;
            for file in files {
                eprintln!("Wrote {}", file.display());
            }
        }
    }

    Ok(())
}

fn selected<'a>(
    cli: &Cli,
    projected: &'a CalculationOutput,
    valuation: &'a CalculationOutput,
) -> Vec<(&'static str, &'a CalculationOutput)> {
    let mut out = Vec::with_capacity(2);
    if cli.scenario.includes_projected() {
        out.push(("Projected", projected));
    }
    if cli.scenario.includes_valuation() {
        out.push(("Valuation", valuation));
    }
    out
}
