//! Single deal-year waterfall: fee, preferred return, catch-up, tier splits
//! and return of capital

use crate::portfolio::Deal;
use log::debug;
use serde::{Deserialize, Serialize};

/// What one LP participant received from a deal in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDistribution {
    pub investor_id: String,
    /// Preferred return plus LP shares of catch-up and tier splits
    pub profit: f64,
    /// Capital returned in the deal's final year
    pub capital: f64,
}

impl ParticipantDistribution {
    pub fn total(&self) -> f64 {
        self.profit + self.capital
    }
}

/// Tier-by-tier allocation of one deal's profit for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAllocation {
    pub year: u32,
    pub deal_investment: f64,
    /// Raw profit before any waterfall step
    pub gross_profit: f64,

    pub management_fee: f64,
    pub pref_accrued: f64,
    pub lp_pref: f64,
    pub gp_catch_up: f64,
    pub lp_catch_up: f64,
    pub gp_first_tier: f64,
    pub lp_first_tier: f64,
    pub gp_second_tier: f64,
    pub lp_second_tier: f64,
    pub return_of_capital: f64,

    /// Amount by which the fee (or a loss) exceeded gross profit
    pub shortfall: f64,

    /// Unpaid preferred return carried into the next year
    pub unpaid_pref: f64,

    pub participants: Vec<ParticipantDistribution>,
}

impl TierAllocation {
    fn empty(year: u32, deal_investment: f64, unpaid_pref: f64) -> Self {
        Self {
            year,
            deal_investment,
            unpaid_pref,
            ..Default::default()
        }
    }

    /// GP share of the first and second tier splits
    pub fn gp_profit_share(&self) -> f64 {
        self.gp_first_tier + self.gp_second_tier
    }

    /// LP share of catch-up and tier splits (excludes preferred return)
    pub fn lp_profit_share(&self) -> f64 {
        self.lp_catch_up + self.lp_first_tier + self.lp_second_tier
    }

    /// Everything the GPs earn from the waterfall, excluding the fee
    pub fn carried_interest(&self) -> f64 {
        self.gp_catch_up + self.gp_profit_share()
    }

    /// Profit paid to LPs, excluding returned capital
    pub fn lp_profit(&self) -> f64 {
        self.lp_pref + self.lp_profit_share()
    }

    /// Everything paid to LPs including returned capital
    pub fn lp_total(&self) -> f64 {
        self.lp_profit() + self.return_of_capital
    }

    /// Fee plus every tier; equals `gross_profit + shortfall`
    pub fn allocated_profit(&self) -> f64 {
        self.management_fee + self.lp_profit() + self.carried_interest()
    }

    /// Spread an LP tier amount across participants by invested share
    fn pay_participants(&mut self, deal: &Deal, amount: f64) {
        for (slot, participant) in self.participants.iter_mut().zip(&deal.participants) {
            slot.profit += amount * participant.amount / self.deal_investment;
        }
    }
}

/// Run one year of a deal's waterfall.
///
/// `unpaid_pref` is the deal's accrued-but-unpaid preferred return; it grows
/// by this year's accrual and shrinks by what is paid. A deal with no
/// invested capital is skipped: no fee, no accrual, no distribution.
pub fn resolve_year(
    deal: &Deal,
    year: u32,
    annual_return_pct: f64,
    unpaid_pref: &mut f64,
) -> TierAllocation {
    let investment = deal.investment();
    if investment <= 0.0 {
        return TierAllocation::empty(year, investment, *unpaid_pref);
    }

    let mut alloc = TierAllocation::empty(year, investment, *unpaid_pref);
    alloc.participants = deal
        .participants
        .iter()
        .map(|p| ParticipantDistribution {
            investor_id: p.investor_id.clone(),
            profit: 0.0,
            capital: 0.0,
        })
        .collect();

    alloc.gross_profit = investment * annual_return_pct / 100.0;
    let mut pool = alloc.gross_profit;

    // 1. Management fee comes off the top
    alloc.management_fee = investment * deal.management_fee / 100.0;
    pool -= alloc.management_fee;

    // 2. Preferred return, accruing when profit falls short
    alloc.pref_accrued = investment * deal.preferred_return / 100.0;
    *unpaid_pref += alloc.pref_accrued;
    let pref_paid = pool.min(*unpaid_pref);
    if pref_paid > 0.0 {
        alloc.pay_participants(deal, pref_paid);
        alloc.lp_pref = pref_paid;
        *unpaid_pref -= pref_paid;
        pool -= pref_paid;
    }

    // 3. GP catch-up, sized against the first tier's LP fraction
    if deal.gp_catch_up.applies && pool > 0.0 {
        let band = investment * (deal.gp_catch_up.hurdle - deal.preferred_return) / 100.0;
        if band > 0.0 {
            let lp_fraction = 1.0 - deal.first_tier.split.gp / 100.0;
            let consumed = pool.min(band / lp_fraction).min(pool).max(0.0);
            let gp_gets = consumed * deal.gp_catch_up.percentage / 100.0;
            let lp_gets = consumed - gp_gets;

            alloc.pay_participants(deal, lp_gets);
            alloc.gp_catch_up = gp_gets;
            alloc.lp_catch_up = lp_gets;
            pool -= consumed;
        }
    }

    // 4. First tier split up to its hurdle
    if pool > 0.0 {
        let band = (investment * (deal.first_tier.hurdle - deal.first_tier_floor()) / 100.0).max(0.0);
        if band > 0.0 {
            let consumed = pool.min(band);
            let split = deal.first_tier.split;
            alloc.gp_first_tier = consumed * split.gp / 100.0;
            alloc.lp_first_tier = consumed * split.lp / 100.0;
            alloc.pay_participants(deal, alloc.lp_first_tier);
            pool -= consumed;
        }
    }

    // 5. Second tier takes everything left
    if pool > 0.0 {
        let split = deal.second_tier.split;
        alloc.gp_second_tier = pool * split.gp / 100.0;
        alloc.lp_second_tier = pool * split.lp / 100.0;
        alloc.pay_participants(deal, alloc.lp_second_tier);
        pool = 0.0;
    }

    if pool < 0.0 {
        alloc.shortfall = -pool;
    }

    // 6. Return of capital in the final year, outside the profit waterfall
    if deal.is_final_year(year) {
        for (slot, participant) in alloc.participants.iter_mut().zip(&deal.participants) {
            slot.capital = participant.amount;
        }
        alloc.return_of_capital = investment;
    }

    alloc.unpaid_pref = *unpaid_pref;

    debug!(
        "{} year {}: gross={:.2} fee={:.2} pref={:.2} catchup={:.2}/{:.2} t1={:.2}/{:.2} t2={:.2}/{:.2} unpaid_pref={:.2}",
        deal.id,
        year,
        alloc.gross_profit,
        alloc.management_fee,
        alloc.lp_pref,
        alloc.gp_catch_up,
        alloc.lp_catch_up,
        alloc.gp_first_tier,
        alloc.lp_first_tier,
        alloc.gp_second_tier,
        alloc.lp_second_tier,
        alloc.unpaid_pref,
    );

    alloc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{Participant, Portfolio, Split};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn sample_deal() -> Deal {
        Portfolio::sample().deals.remove(0)
    }

    fn assert_conserves(alloc: &TierAllocation) {
        assert_relative_eq!(
            alloc.allocated_profit() - alloc.shortfall,
            alloc.gross_profit,
            epsilon = 1e-9,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_sample_year_one_at_fifteen_percent() {
        // 1,000,000 at 15%: pref 80k, catch-up band 20k/0.8 = 25k all to GP,
        // first tier takes the remaining 45k at 80/20
        let deal = sample_deal();
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 15.0, &mut unpaid);

        assert_abs_diff_eq!(alloc.gross_profit, 150_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_pref, 80_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.gp_catch_up, 25_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_catch_up, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.gp_first_tier, 9_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_first_tier, 36_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.gp_second_tier + alloc.lp_second_tier, 0.0, epsilon = 1e-6);
        assert_eq!(unpaid, 0.0);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_second_tier_receives_excess() {
        let deal = sample_deal();
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 30.0, &mut unpaid);

        // 300k: pref 80k, catch-up 25k, first tier 50k, second tier 145k at 60/40
        assert_abs_diff_eq!(alloc.gp_second_tier, 58_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_second_tier, 87_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.carried_interest(), 25_000.0 + 10_000.0 + 58_000.0, epsilon = 1e-6);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_pref_accrues_when_profit_short() {
        let deal = sample_deal();
        let mut unpaid = 0.0;

        let year1 = resolve_year(&deal, 1, 5.0, &mut unpaid);
        assert_abs_diff_eq!(year1.lp_pref, 50_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(unpaid, 30_000.0, epsilon = 1e-6);
        assert_eq!(year1.carried_interest(), 0.0);

        // Year 2: owed 30k + 80k = 110k, profit 120k pays it all, 10k to catch-up
        let before = unpaid;
        let year2 = resolve_year(&deal, 2, 12.0, &mut unpaid);
        assert_abs_diff_eq!(year2.lp_pref, 110_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(unpaid, before + year2.pref_accrued - year2.lp_pref, epsilon = 1e-9);
        assert_abs_diff_eq!(unpaid, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(year2.gp_catch_up, 10_000.0, epsilon = 1e-6);
        assert_conserves(&year2);
    }

    #[test]
    fn test_accrual_never_negative_over_path() {
        let deal = sample_deal();
        let mut unpaid = 0.0;
        for (year, pct) in [(1, 0.0), (2, -10.0), (3, 40.0), (4, 3.0), (5, 9.0)] {
            let before = unpaid;
            let alloc = resolve_year(&deal, year, pct, &mut unpaid);
            assert!(unpaid >= 0.0);
            assert_abs_diff_eq!(unpaid, before + alloc.pref_accrued - alloc.lp_pref, epsilon = 1e-9);
            assert_eq!(alloc.unpaid_pref, unpaid);
        }
    }

    #[test]
    fn test_pro_rata_participants() {
        let deal = sample_deal();
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 30.0, &mut unpaid);

        let lp_profit = alloc.lp_profit();
        assert_abs_diff_eq!(alloc.participants[0].profit, lp_profit * 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.participants[1].profit, lp_profit * 0.25, epsilon = 1e-6);

        let summed: f64 = alloc.participants.iter().map(|p| p.profit).sum();
        assert_abs_diff_eq!(summed, lp_profit, epsilon = 1e-6);
    }

    #[test]
    fn test_return_of_capital_in_final_year_only() {
        let deal = sample_deal();
        let mut unpaid = 0.0;

        let year4 = resolve_year(&deal, 4, 10.0, &mut unpaid);
        assert_eq!(year4.return_of_capital, 0.0);
        assert!(year4.participants.iter().all(|p| p.capital == 0.0));

        let year5 = resolve_year(&deal, 5, 10.0, &mut unpaid);
        assert_eq!(year5.return_of_capital, 1_000_000.0);
        assert_eq!(year5.participants[0].capital, 750_000.0);
        assert_eq!(year5.participants[1].capital, 250_000.0);
        assert_abs_diff_eq!(year5.lp_total(), year5.lp_profit() + 1_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_investment_skipped() {
        let mut deal = sample_deal();
        for p in &mut deal.participants {
            p.amount = 0.0;
        }
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 5, 25.0, &mut unpaid);

        assert_eq!(alloc.allocated_profit(), 0.0);
        assert_eq!(alloc.return_of_capital, 0.0);
        assert_eq!(alloc.pref_accrued, 0.0);
        assert!(alloc.participants.is_empty());
        assert_eq!(unpaid, 0.0);
    }

    #[test]
    fn test_fee_exceeding_profit_reports_shortfall() {
        let mut deal = sample_deal();
        deal.management_fee = 2.0;
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 1.0, &mut unpaid);

        assert_abs_diff_eq!(alloc.management_fee, 20_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.shortfall, 10_000.0, epsilon = 1e-6);
        assert_eq!(alloc.lp_pref, 0.0);
        assert_abs_diff_eq!(unpaid, 80_000.0, epsilon = 1e-6);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_inverted_hurdles_clamp_to_zero() {
        let mut deal = sample_deal();
        deal.gp_catch_up.hurdle = 6.0; // below pref
        deal.first_tier.hurdle = 5.0; // below catch-up
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 20.0, &mut unpaid);

        assert_eq!(alloc.gp_catch_up, 0.0);
        assert_eq!(alloc.lp_catch_up, 0.0);
        assert_eq!(alloc.gp_first_tier, 0.0);
        assert_eq!(alloc.lp_first_tier, 0.0);
        // Everything above pref goes straight to the second tier
        assert_abs_diff_eq!(alloc.gp_second_tier + alloc.lp_second_tier, 120_000.0, epsilon = 1e-6);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_catch_up_without_full_gp_share() {
        let mut deal = sample_deal();
        deal.gp_catch_up.percentage = 50.0;
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 12.0, &mut unpaid);

        // 40k after pref, band capacity 25k, split 50/50
        assert_abs_diff_eq!(alloc.gp_catch_up, 12_500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_catch_up, 12_500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(alloc.lp_first_tier, 12_000.0, epsilon = 1e-6);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_full_gp_first_tier_split_takes_whole_pool_in_catch_up() {
        let mut deal = sample_deal();
        deal.first_tier.split = Split::new(0.0, 100.0);
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 20.0, &mut unpaid);

        assert_abs_diff_eq!(alloc.gp_catch_up, 120_000.0, epsilon = 1e-6);
        assert_eq!(alloc.gp_first_tier, 0.0);
        assert_conserves(&alloc);
    }

    #[test]
    fn test_no_catch_up_first_tier_starts_at_pref() {
        let mut deal = sample_deal();
        deal.gp_catch_up.applies = false;
        deal.participants = vec![Participant::new("lp1", 100.0)];
        let mut unpaid = 0.0;
        let alloc = resolve_year(&deal, 1, 20.0, &mut unpaid);

        // 20 profit: 8 pref, first tier band 7 (8% -> 15%), 5 to second tier
        assert_abs_diff_eq!(alloc.lp_pref, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(alloc.gp_first_tier + alloc.lp_first_tier, 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(alloc.gp_second_tier + alloc.lp_second_tier, 5.0, epsilon = 1e-12);
        assert_conserves(&alloc);
    }
}
