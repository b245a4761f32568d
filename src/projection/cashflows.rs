//! Output structures for scenario runs

use serde::{Deserialize, Serialize};

/// Tier totals for one year, used for both annual and cumulative charts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierChartPoint {
    pub year: u32,
    pub lp_pref: f64,
    /// LP shares of catch-up, first and second tier
    pub lp_profit_share: f64,
    pub gp_catch_up: f64,
    /// GP shares of first and second tier
    pub gp_profit_share: f64,
    pub gp_mgmt_fee: f64,
}

impl TierChartPoint {
    pub fn new(year: u32) -> Self {
        Self { year, ..Default::default() }
    }

    pub fn total(&self) -> f64 {
        self.lp_pref + self.lp_profit_share + self.gp_catch_up + self.gp_profit_share + self.gp_mgmt_fee
    }

    /// This year's values added onto a prior running total
    fn accumulate(&self, prior: &TierChartPoint) -> TierChartPoint {
        TierChartPoint {
            year: self.year,
            lp_pref: prior.lp_pref + self.lp_pref,
            lp_profit_share: prior.lp_profit_share + self.lp_profit_share,
            gp_catch_up: prior.gp_catch_up + self.gp_catch_up,
            gp_profit_share: prior.gp_profit_share + self.gp_profit_share,
            gp_mgmt_fee: prior.gp_mgmt_fee + self.gp_mgmt_fee,
        }
    }
}

/// Running tier-by-tier totals of an annual series
pub fn cumulative_series(annual: &[TierChartPoint]) -> Vec<TierChartPoint> {
    let mut running = TierChartPoint::default();
    annual
        .iter()
        .map(|point| {
            running = point.accumulate(&running);
            running.clone()
        })
        .collect()
}

/// Portfolio cash movement for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyBreakdown {
    pub year: u32,
    /// Gross profit across funded deals, before fees
    pub gross_return: f64,
    /// Everything paid to known LPs, including returned capital
    pub lp_distributions: f64,
    /// Management fees plus carried interest across GPs
    pub gp_earnings: f64,
    pub total_distribution: f64,
}

/// Cumulative LP distributions, projected against valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeReturnPoint {
    pub year: u32,
    pub projected: f64,
    /// `None` when no deal carries any actual return data
    pub valuation: Option<f64>,
}

/// One LP's position in one deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpDealPerformance {
    pub deal_id: String,
    pub deal_name: String,
    pub investment: f64,
    pub distribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpPerformance {
    pub investor_id: String,
    pub name: String,
    pub allocated: f64,
    pub distributions: f64,
    pub moic: f64,
    /// `None` when undefined or not converged; render as "N/A"
    pub irr: Option<f64>,
    /// Year 0 investment followed by annual distributions
    pub cashflows: Vec<f64>,
    pub deal_breakdown: Vec<LpDealPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpPerformance {
    pub investor_id: String,
    pub name: String,
    pub management_fees: f64,
    pub carried_interest: f64,
    pub total_earnings: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    #[serde(rename = "totalLPAllocated")]
    pub total_lp_allocated: f64,
    #[serde(rename = "totalLPDistributions")]
    pub total_lp_distributions: f64,
    #[serde(rename = "totalGPEarnings")]
    pub total_gp_earnings: f64,
    #[serde(rename = "totalGPManagementFees")]
    pub total_gp_management_fees: f64,
    #[serde(rename = "totalGPCarriedInterest")]
    pub total_gp_carried_interest: f64,
    #[serde(rename = "overallLPMOIC")]
    pub overall_lp_moic: f64,
    /// IRR of the aggregate LP cashflow vector
    #[serde(rename = "portfolioLPIRR")]
    pub portfolio_lp_irr: Option<f64>,
}

/// Complete result of one scenario run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOutput {
    pub summary_metrics: SummaryMetrics,
    pub yearly_breakdown: Vec<YearlyBreakdown>,
    pub annual_distribution_chart_data: Vec<TierChartPoint>,
    pub cumulative_tier_chart_data: Vec<TierChartPoint>,
    pub lp_performance: Vec<LpPerformance>,
    pub gp_performance: Vec<GpPerformance>,
    /// Shared comparison series, filled in by the scenario runner
    pub cumulative_return_chart_data: Vec<CumulativeReturnPoint>,
}

impl CalculationOutput {
    pub fn lp(&self, investor_id: &str) -> Option<&LpPerformance> {
        self.lp_performance.iter().find(|lp| lp.investor_id == investor_id)
    }

    pub fn gp(&self, investor_id: &str) -> Option<&GpPerformance> {
        self.gp_performance.iter().find(|gp| gp.investor_id == investor_id)
    }

    pub fn years(&self) -> u32 {
        self.yearly_breakdown.len() as u32
    }
}

/// Both scenarios plus the comparison series they share
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    pub projected: CalculationOutput,
    pub valuation: CalculationOutput,
    pub cumulative_return_chart_data: Vec<CumulativeReturnPoint>,
}
