//! Scenario engine: the annual waterfall loop across all deals

use super::cashflows::{cumulative_series, CalculationOutput, TierChartPoint, YearlyBreakdown};
use super::irr::IrrSettings;
use super::performance::{summarize, GpLedger, LpLedger};
use super::state::AccrualState;
use super::tiers::resolve_year;
use crate::portfolio::{Deal, Investor, ReturnBasis};
use log::{debug, info};
use std::collections::HashMap;

/// Configuration for a projection run
#[derive(Debug, Clone, Default)]
pub struct ProjectionConfig {
    /// IRR solver parameters used for every LP and the portfolio
    pub irr: IrrSettings,
}

/// How aggregate fees and carry are apportioned among GPs
#[derive(Debug, Clone, PartialEq)]
pub struct CarrySplit {
    shares: Vec<f64>,
}

impl CarrySplit {
    /// Shares proportional to carry weight, or equal when all weights are zero
    pub fn from_gps(gps: &[&Investor]) -> Self {
        let weights: Vec<f64> = gps
            .iter()
            .map(|gp| gp.carry_percentage().unwrap_or(0.0))
            .collect();
        let total: f64 = weights.iter().sum();

        let shares = if total > 0.0 {
            weights.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / gps.len() as f64; gps.len()]
        };

        Self { shares }
    }

    /// Share of the GP at position `idx`
    pub fn share(&self, idx: usize) -> f64 {
        self.shares.get(idx).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

/// Runs one scenario for a fixed investor set
pub struct ScenarioEngine<'a> {
    lps: Vec<&'a Investor>,
    gps: Vec<&'a Investor>,
    carry: CarrySplit,
    config: ProjectionConfig,
}

impl<'a> ScenarioEngine<'a> {
    pub fn new(investors: &'a [Investor], config: ProjectionConfig) -> Self {
        let (gps, lps): (Vec<&Investor>, Vec<&Investor>) = investors.iter().partition(|i| i.is_gp());
        let carry = CarrySplit::from_gps(&gps);
        Self { lps, gps, carry, config }
    }

    /// Run every active deal through the waterfall, year by year.
    ///
    /// Accrual state lives only inside this call, so repeated runs over the
    /// same deals give identical results.
    pub fn run(&self, deals: &[Deal], basis: ReturnBasis) -> CalculationOutput {
        let deals: Vec<&Deal> = deals.iter().filter(|d| d.is_active).collect();
        let max_years = deals.iter().map(|d| d.timeline_years).max().unwrap_or(0);

        info!(
            "Running {} scenario: {} deals over {} years",
            basis.as_str(),
            deals.len(),
            max_years
        );

        let mut lp_ledgers: Vec<LpLedger> = self.lps.iter().map(|lp| LpLedger::new(lp, max_years)).collect();
        let lp_index: HashMap<&str, usize> = self
            .lps
            .iter()
            .enumerate()
            .map(|(idx, lp)| (lp.id.as_str(), idx))
            .collect();
        let mut gp_ledgers: Vec<GpLedger> = self.gps.iter().map(|gp| GpLedger::new(gp, max_years)).collect();

        for deal in &deals {
            for participant in &deal.participants {
                if let Some(&idx) = lp_index.get(participant.investor_id.as_str()) {
                    lp_ledgers[idx].add_investment(deal, participant.amount);
                }
            }
        }

        let mut accruals = AccrualState::new();
        let mut yearly_breakdown = Vec::with_capacity(max_years as usize);
        let mut annual_chart = Vec::with_capacity(max_years as usize);

        for year in 1..=max_years {
            let mut chart = TierChartPoint::new(year);
            let mut gross_return = 0.0;

            for deal in deals.iter().filter(|d| d.timeline_years >= year) {
                if deal.investment() <= 0.0 {
                    continue;
                }

                let annual_return = deal.return_for_year(year, basis);
                let alloc = resolve_year(deal, year, annual_return, accruals.slot(&deal.id));

                gross_return += alloc.gross_profit;
                chart.gp_mgmt_fee += alloc.management_fee;
                chart.lp_pref += alloc.lp_pref;
                chart.gp_catch_up += alloc.gp_catch_up;
                chart.lp_profit_share += alloc.lp_profit_share();
                chart.gp_profit_share += alloc.gp_profit_share();

                for (idx, ledger) in gp_ledgers.iter_mut().enumerate() {
                    let share = self.carry.share(idx);
                    ledger.add_management_fee(year, alloc.management_fee * share);
                    ledger.add_carried_interest(year, alloc.carried_interest() * share);
                }

                for dist in &alloc.participants {
                    if let Some(&idx) = lp_index.get(dist.investor_id.as_str()) {
                        lp_ledgers[idx].add_distribution(&deal.id, year, dist.total());
                    }
                }
            }

            let lp_distributions: f64 = lp_ledgers.iter().map(|l| l.distribution_in(year)).sum();
            let gp_earnings: f64 = gp_ledgers.iter().map(|g| g.earnings_in(year)).sum();

            debug!(
                "Year {}: gross={:.2} lp={:.2} gp={:.2} unpaid_pref={:.2}",
                year,
                gross_return,
                lp_distributions,
                gp_earnings,
                accruals.total_unpaid()
            );

            yearly_breakdown.push(YearlyBreakdown {
                year,
                gross_return,
                lp_distributions,
                gp_earnings,
                total_distribution: lp_distributions + gp_earnings,
            });
            annual_chart.push(chart);
        }

        let lp_performance: Vec<_> = lp_ledgers
            .into_iter()
            .map(|ledger| ledger.finish(&self.config.irr))
            .collect();
        let gp_performance: Vec<_> = gp_ledgers.into_iter().map(GpLedger::finish).collect();
        let summary_metrics = summarize(&lp_performance, &gp_performance, &self.config.irr);

        info!(
            "{} scenario complete: LP distributions {:.2}, GP earnings {:.2}",
            basis.as_str(),
            summary_metrics.total_lp_distributions,
            summary_metrics.total_gp_earnings
        );

        CalculationOutput {
            summary_metrics,
            yearly_breakdown,
            cumulative_tier_chart_data: cumulative_series(&annual_chart),
            annual_distribution_chart_data: annual_chart,
            lp_performance,
            gp_performance,
            cumulative_return_chart_data: Vec::new(),
        }
    }
}
