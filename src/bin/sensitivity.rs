//! Sweep every deal's projected return up and down and report how the
//! headline LP/GP numbers respond

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use waterfall_system::portfolio::{load_portfolio, Portfolio};
use waterfall_system::report::{format_currency, format_irr, format_multiple};
use waterfall_system::ScenarioRunner;

#[derive(Parser)]
#[command(name = "sensitivity", about = "Projected-return sensitivity sweep")]
struct Args {
    /// Portfolio JSON file (defaults to the built-in sample portfolio)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Largest shift in percentage points, applied in both directions
    #[arg(long, default_value_t = 5)]
    range: u32,

    /// Print the sweep as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let portfolio = match &args.input {
        Some(path) => load_portfolio(path)
            .with_context(|| format!("failed to load portfolio from {}", path.display()))?,
        None => Portfolio::sample(),
    };

    let range = args.range as i64;
    let shifts: Vec<f64> = (-range..=range).map(|s| s as f64).collect();

    let start = Instant::now();
    let runner = ScenarioRunner::new();
    let points = runner.run_sensitivity(&portfolio.investors, &portfolio.active_deals(), &shifts);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("Ran {} scenarios in {:?}\n", points.len(), start.elapsed());
    println!("{:>6} {:>8} {:>16} {:>16} {:>8}", "Shift", "MOIC", "LP Dist", "GP Carry", "IRR");
    println!("{}", "-".repeat(58));
    for point in &points {
        println!(
            "{:>+6.1} {:>8} {:>16} {:>16} {:>8}",
            point.shift,
            format_multiple(point.overall_lp_moic),
            format_currency(point.total_lp_distributions),
            format_currency(point.total_gp_carried_interest),
            format_irr(point.portfolio_lp_irr),
        );
    }

    Ok(())
}
