//! Per-investor cashflow ledgers and the metrics derived from them

use super::cashflows::{GpPerformance, LpDealPerformance, LpPerformance, SummaryMetrics};
use super::irr::{calculate_irr, IrrSettings};
use crate::portfolio::{Deal, Investor};

/// Multiple on invested capital; 0 when nothing was invested
pub fn moic(distributions: f64, allocated: f64) -> f64 {
    if allocated > 0.0 {
        distributions / allocated
    } else {
        0.0
    }
}

/// Running cashflow history for one LP during a scenario run
#[derive(Debug, Clone)]
pub struct LpLedger {
    investor_id: String,
    name: String,
    allocated: f64,
    /// Index 0 holds the investment, 1..=years the annual distributions
    cashflows: Vec<f64>,
    deal_breakdown: Vec<LpDealPerformance>,
}

impl LpLedger {
    pub fn new(investor: &Investor, years: u32) -> Self {
        Self {
            investor_id: investor.id.clone(),
            name: investor.name.clone(),
            allocated: 0.0,
            cashflows: vec![0.0; years as usize + 1],
            deal_breakdown: Vec::new(),
        }
    }

    /// Record capital committed to a deal at year 0
    pub fn add_investment(&mut self, deal: &Deal, amount: f64) {
        self.allocated += amount;
        match self.deal_breakdown.iter_mut().find(|d| d.deal_id == deal.id) {
            Some(entry) => entry.investment += amount,
            None => self.deal_breakdown.push(LpDealPerformance {
                deal_id: deal.id.clone(),
                deal_name: deal.name.clone(),
                investment: amount,
                distribution: 0.0,
            }),
        }
    }

    /// Record a distribution received from a deal in a given year
    pub fn add_distribution(&mut self, deal_id: &str, year: u32, amount: f64) {
        if let Some(slot) = self.cashflows.get_mut(year as usize) {
            *slot += amount;
        }
        if let Some(entry) = self.deal_breakdown.iter_mut().find(|d| d.deal_id == deal_id) {
            entry.distribution += amount;
        }
    }

    /// Amount received in a given year
    pub fn distribution_in(&self, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        self.cashflows.get(year as usize).copied().unwrap_or(0.0)
    }

    /// Signed cashflow vector with the investment at year 0
    pub fn signed_cashflows(&self) -> Vec<f64> {
        let mut cashflows = self.cashflows.clone();
        cashflows[0] = -self.allocated;
        cashflows
    }

    pub fn finish(self, settings: &IrrSettings) -> LpPerformance {
        let cashflows = self.signed_cashflows();
        let distributions: f64 = cashflows.iter().skip(1).sum();
        let irr = calculate_irr(&cashflows, settings);

        LpPerformance {
            investor_id: self.investor_id,
            name: self.name,
            allocated: self.allocated,
            distributions,
            moic: moic(distributions, self.allocated),
            irr,
            cashflows,
            deal_breakdown: self.deal_breakdown,
        }
    }
}

/// Running fee and carry history for one GP during a scenario run
#[derive(Debug, Clone)]
pub struct GpLedger {
    investor_id: String,
    name: String,
    management_fees: Vec<f64>,
    carried_interest: Vec<f64>,
}

impl GpLedger {
    pub fn new(investor: &Investor, years: u32) -> Self {
        Self {
            investor_id: investor.id.clone(),
            name: investor.name.clone(),
            management_fees: vec![0.0; years as usize + 1],
            carried_interest: vec![0.0; years as usize + 1],
        }
    }

    pub fn add_management_fee(&mut self, year: u32, amount: f64) {
        if let Some(slot) = self.management_fees.get_mut(year as usize) {
            *slot += amount;
        }
    }

    pub fn add_carried_interest(&mut self, year: u32, amount: f64) {
        if let Some(slot) = self.carried_interest.get_mut(year as usize) {
            *slot += amount;
        }
    }

    /// Fees plus carry earned in a given year
    pub fn earnings_in(&self, year: u32) -> f64 {
        let idx = year as usize;
        self.management_fees.get(idx).copied().unwrap_or(0.0)
            + self.carried_interest.get(idx).copied().unwrap_or(0.0)
    }

    pub fn finish(self) -> GpPerformance {
        let management_fees: f64 = self.management_fees.iter().sum();
        let carried_interest: f64 = self.carried_interest.iter().sum();

        GpPerformance {
            investor_id: self.investor_id,
            name: self.name,
            management_fees,
            carried_interest,
            total_earnings: management_fees + carried_interest,
        }
    }
}

/// Portfolio totals across all LPs and GPs
pub fn summarize(lps: &[LpPerformance], gps: &[GpPerformance], settings: &IrrSettings) -> SummaryMetrics {
    let total_lp_allocated: f64 = lps.iter().map(|lp| lp.allocated).sum();
    let total_lp_distributions: f64 = lps.iter().map(|lp| lp.distributions).sum();

    let years = lps.iter().map(|lp| lp.cashflows.len()).max().unwrap_or(0);
    let mut aggregate = vec![0.0; years];
    for lp in lps {
        for (slot, cf) in aggregate.iter_mut().zip(&lp.cashflows) {
            *slot += cf;
        }
    }

    SummaryMetrics {
        total_lp_allocated,
        total_lp_distributions,
        total_gp_earnings: gps.iter().map(|gp| gp.total_earnings).sum(),
        total_gp_management_fees: gps.iter().map(|gp| gp.management_fees).sum(),
        total_gp_carried_interest: gps.iter().map(|gp| gp.carried_interest).sum(),
        overall_lp_moic: moic(total_lp_distributions, total_lp_allocated),
        portfolio_lp_irr: calculate_irr(&aggregate, settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Portfolio;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_moic() {
        assert_eq!(moic(1_500_000.0, 1_000_000.0), 1.5);
        assert_eq!(moic(500.0, 0.0), 0.0);
    }

    #[test]
    fn test_lp_ledger_metrics() {
        let portfolio = Portfolio::sample();
        let deal = &portfolio.deals[0];
        let lp = portfolio.investor("lp1").unwrap();

        let mut ledger = LpLedger::new(lp, 3);
        ledger.add_investment(deal, 1_000_000.0);
        ledger.add_distribution(&deal.id, 1, 100_000.0);
        ledger.add_distribution(&deal.id, 2, 100_000.0);
        ledger.add_distribution(&deal.id, 3, 1_300_000.0);

        let perf = ledger.finish(&IrrSettings::default());
        assert_eq!(perf.allocated, 1_000_000.0);
        assert_eq!(perf.distributions, 1_500_000.0);
        assert_eq!(perf.moic, 1.5);
        assert_eq!(perf.cashflows[0], -1_000_000.0);
        assert!(perf.irr.unwrap() > 0.15);
        assert_eq!(perf.deal_breakdown.len(), 1);
        assert_eq!(perf.deal_breakdown[0].distribution, 1_500_000.0);
    }

    #[test]
    fn test_lp_without_allocation() {
        let portfolio = Portfolio::sample();
        let lp = portfolio.investor("lp2").unwrap();
        let perf = LpLedger::new(lp, 5).finish(&IrrSettings::default());

        assert_eq!(perf.moic, 0.0);
        assert_eq!(perf.irr, None);
        assert!(perf.deal_breakdown.is_empty());
    }

    #[test]
    fn test_gp_ledger() {
        let portfolio = Portfolio::sample();
        let gp = portfolio.investor("gp1").unwrap();

        let mut ledger = GpLedger::new(gp, 2);
        ledger.add_management_fee(1, 10.0);
        ledger.add_carried_interest(1, 5.0);
        ledger.add_carried_interest(2, 7.5);
        assert_eq!(ledger.earnings_in(1), 15.0);

        let perf = ledger.finish();
        assert_eq!(perf.management_fees, 10.0);
        assert_eq!(perf.carried_interest, 12.5);
        assert_eq!(perf.total_earnings, 22.5);
    }

    #[test]
    fn test_summarize() {
        let portfolio = Portfolio::sample();
        let deal = &portfolio.deals[0];
        let settings = IrrSettings::default();

        let mut a = LpLedger::new(portfolio.investor("lp1").unwrap(), 1);
        a.add_investment(deal, 600.0);
        a.add_distribution(&deal.id, 1, 660.0);
        let mut b = LpLedger::new(portfolio.investor("lp2").unwrap(), 1);
        b.add_investment(deal, 400.0);
        b.add_distribution(&deal.id, 1, 440.0);
        let lps = vec![a.finish(&settings), b.finish(&settings)];

        let mut gp = GpLedger::new(portfolio.investor("gp1").unwrap(), 1);
        gp.add_management_fee(1, 3.0);
        gp.add_carried_interest(1, 4.0);
        let gps = vec![gp.finish()];

        let summary = summarize(&lps, &gps, &settings);
        assert_eq!(summary.total_lp_allocated, 1000.0);
        assert_eq!(summary.total_lp_distributions, 1100.0);
        assert_abs_diff_eq!(summary.overall_lp_moic, 1.1, epsilon = 1e-12);
        assert_eq!(summary.total_gp_earnings, 7.0);
        assert_eq!(summary.total_gp_carried_interest, 4.0);
        assert_eq!(summary.total_gp_management_fees, 3.0);
        assert_abs_diff_eq!(summary.portfolio_lp_irr.unwrap(), 0.10, epsilon = 1e-6);
    }
}
