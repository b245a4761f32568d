//! Scenario runner: projected vs. valuation projections and sensitivity sweeps
//!
//! Each scenario run owns its own accrual state, so the two runs (and any
//! number of parallel sensitivity runs) never observe each other.

use crate::error::Result;
use crate::portfolio::{validate_portfolio, Deal, Investor, Portfolio, ReturnBasis, ValidationWarning};
use crate::projection::{
    CalculationOutput, CumulativeReturnPoint, Projections, ProjectionConfig, ScenarioEngine,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Projected-scenario headline numbers for one return shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    /// Percentage points added to every deal's projected return
    pub shift: f64,
    #[serde(rename = "overallLPMOIC")]
    pub overall_lp_moic: f64,
    #[serde(rename = "totalLPDistributions")]
    pub total_lp_distributions: f64,
    #[serde(rename = "totalGPCarriedInterest")]
    pub total_gp_carried_interest: f64,
    #[serde(rename = "portfolioLPIRR")]
    pub portfolio_lp_irr: Option<f64>,
}

/// Runs waterfall scenarios with a shared configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let portfolio = Portfolio::sample();
/// let projections = runner.project(&portfolio.investors, &portfolio.deals);
/// println!("{:.2}x", projections.projected.summary_metrics.overall_lp_moic);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run a single scenario
    pub fn run(&self, investors: &[Investor], deals: &[Deal], basis: ReturnBasis) -> CalculationOutput {
        ScenarioEngine::new(investors, self.config.clone()).run(deals, basis)
    }

    /// Run both scenarios over the active deals and build the comparison series
    pub fn project(&self, investors: &[Investor], deals: &[Deal]) -> Projections {
        let active: Vec<Deal> = deals.iter().filter(|d| d.is_active).cloned().collect();
        let engine = ScenarioEngine::new(investors, self.config.clone());

        let mut projected = engine.run(&active, ReturnBasis::Projected);
        let mut valuation = engine.run(&active, ReturnBasis::Valuation);

        let comparison = comparison_series(&active, &projected, &valuation);
        projected.cumulative_return_chart_data = comparison.clone();
        valuation.cumulative_return_chart_data = comparison.clone();

        Projections {
            projected,
            valuation,
            cumulative_return_chart_data: comparison,
        }
    }

    pub fn project_portfolio(&self, portfolio: &Portfolio) -> Projections {
        self.project(&portfolio.investors, &portfolio.deals)
    }

    /// Validate the portfolio first, then project it
    pub fn try_project(&self, portfolio: &Portfolio) -> Result<(Projections, Vec<ValidationWarning>)> {
        let warnings = validate_portfolio(portfolio)?;
        Ok((self.project_portfolio(portfolio), warnings))
    }

    /// Re-run the projected scenario once per shift, in parallel
    pub fn run_sensitivity(&self, investors: &[Investor], deals: &[Deal], shifts: &[f64]) -> Vec<SensitivityPoint> {
        let engine = ScenarioEngine::new(investors, self.config.clone());

        shifts
            .par_iter()
            .map(|&shift| {
                let shifted: Vec<Deal> = deals
                    .iter()
                    .map(|deal| {
                        let mut deal = deal.clone();
                        deal.projected_annual_return += shift;
                        deal
                    })
                    .collect();
                let summary = engine.run(&shifted, ReturnBasis::Projected).summary_metrics;

                SensitivityPoint {
                    shift,
                    overall_lp_moic: summary.overall_lp_moic,
                    total_lp_distributions: summary.total_lp_distributions,
                    total_gp_carried_interest: summary.total_gp_carried_interest,
                    portfolio_lp_irr: summary.portfolio_lp_irr,
                }
            })
            .collect()
    }
}

/// Cumulative LP distributions per year; valuation is absent when no deal
/// has ever recorded an actual return
fn comparison_series(
    deals: &[Deal],
    projected: &CalculationOutput,
    valuation: &CalculationOutput,
) -> Vec<CumulativeReturnPoint> {
    let valuation_has_data = deals.iter().any(Deal::has_actual_returns);
    let max_years = deals.iter().map(|d| d.timeline_years).max().unwrap_or(0);

    let lp_in = |output: &CalculationOutput, year: u32| {
        output
            .yearly_breakdown
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.lp_distributions)
            .unwrap_or(0.0)
    };

    let mut cumulative_projected = 0.0;
    let mut cumulative_valuation = 0.0;

    (1..=max_years)
        .map(|year| {
            cumulative_projected += lp_in(projected, year);
            cumulative_valuation += lp_in(valuation, year);
            CumulativeReturnPoint {
                year,
                projected: cumulative_projected,
                valuation: valuation_has_data.then_some(cumulative_valuation),
            }
        })
        .collect()
}
