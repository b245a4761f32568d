//! Preferred-return accrual carried across years within one scenario run

use std::collections::HashMap;

/// Unpaid preferred return per deal
///
/// Created empty at the start of every scenario run and dropped at its end,
/// so accruals never leak between the projected and valuation scenarios and
/// deal records are never mutated.
#[derive(Debug, Clone, Default)]
pub struct AccrualState {
    unpaid_pref: HashMap<String, f64>,
}

impl AccrualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current unpaid preferred return for a deal (0 if never accrued)
    pub fn unpaid_pref(&self, deal_id: &str) -> f64 {
        self.unpaid_pref.get(deal_id).copied().unwrap_or(0.0)
    }

    /// Mutable accrual slot for a deal, created at 0 on first use
    pub fn slot(&mut self, deal_id: &str) -> &mut f64 {
        self.unpaid_pref.entry(deal_id.to_string()).or_insert(0.0)
    }

    /// Sum of unpaid preferred return across all deals
    pub fn total_unpaid(&self) -> f64 {
        self.unpaid_pref.values().sum()
    }
}
