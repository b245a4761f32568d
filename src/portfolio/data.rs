//! Investor, deal and portfolio records matching the portfolio file format

use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// Which return series drives a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnBasis {
    /// Flat `projected_annual_return` every year
    Projected,
    /// Year-by-year `actual_annual_returns`, missing years count as 0%
    Valuation,
}

impl ReturnBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnBasis::Projected => "projected",
            ReturnBasis::Valuation => "valuation",
        }
    }
}

/// Role-specific attributes of an investor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvestorRole {
    /// Limited partner. Commitment is informational and not enforced.
    Limited { commitment: f64 },
    /// General partner. Carry percentage is a relative weight across GPs.
    General { carry_percentage: f64 },
}

/// A fund investor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InvestorRecord", into = "InvestorRecord")]
pub struct Investor {
    /// Unique investor identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// LP or GP attributes
    pub role: InvestorRole,
}

/// Flat investor shape used in portfolio files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvestorRecord {
    id: String,
    name: String,
    #[serde(default)]
    commitment: f64,
    #[serde(rename = "isGP")]
    is_gp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gp_carry_percentage: Option<f64>,
}

impl From<InvestorRecord> for Investor {
    fn from(record: InvestorRecord) -> Self {
        let role = if record.is_gp {
            // A GP saved without a carry weight takes part in the equal split
            InvestorRole::General {
                carry_percentage: record.gp_carry_percentage.unwrap_or(0.0),
            }
        } else {
            InvestorRole::Limited { commitment: record.commitment }
        };
        Self { id: record.id, name: record.name, role }
    }
}

impl From<Investor> for InvestorRecord {
    fn from(investor: Investor) -> Self {
        let (commitment, is_gp, gp_carry_percentage) = match investor.role {
            InvestorRole::Limited { commitment } => (commitment, false, None),
            InvestorRole::General { carry_percentage } => (0.0, true, Some(carry_percentage)),
        };
        Self {
            id: investor.id,
            name: investor.name,
            commitment,
            is_gp,
            gp_carry_percentage,
        }
    }
}

impl Investor {
    pub fn limited(id: impl Into<String>, name: impl Into<String>, commitment: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: InvestorRole::Limited { commitment },
        }
    }

    pub fn general(id: impl Into<String>, name: impl Into<String>, carry_percentage: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: InvestorRole::General { carry_percentage },
        }
    }

    pub fn is_gp(&self) -> bool {
        matches!(self.role, InvestorRole::General { .. })
    }

    /// Carry weight for GPs, `None` for LPs
    pub fn carry_percentage(&self) -> Option<f64> {
        match self.role {
            InvestorRole::General { carry_percentage } => Some(carry_percentage),
            InvestorRole::Limited { .. } => None,
        }
    }

    /// Commitment for LPs, `None` for GPs
    pub fn commitment(&self) -> Option<f64> {
        match self.role {
            InvestorRole::Limited { commitment } => Some(commitment),
            InvestorRole::General { .. } => None,
        }
    }
}

/// LP / GP percentage split of a profit band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub lp: f64,
    pub gp: f64,
}

impl Split {
    pub fn new(lp: f64, gp: f64) -> Self {
        Self { lp, gp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpCatchUp {
    /// Whether the catch-up band exists at all
    pub applies: bool,
    /// GP share of profit inside the band (%)
    pub percentage: f64,
    /// Cumulative return (%) at which the band ends
    pub hurdle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstTier {
    pub split: Split,
    /// Cumulative return (%) at which the first tier ends
    pub hurdle: f64,
}

/// Open-ended top tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondTier {
    pub split: Split,
}

/// An LP's capital in a deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub investor_id: String,
    pub amount: f64,
}

impl Participant {
    pub fn new(investor_id: impl Into<String>, amount: f64) -> Self {
        Self {
            investor_id: investor_id.into(),
            amount,
        }
    }
}

/// A single investment deal with its own waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Unique deal identifier
    pub id: String,

    pub name: String,

    /// Inactive deals are excluded from every calculation
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Participating LPs and their invested amounts
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Flat annual return (%) used by the projected scenario
    pub projected_annual_return: f64,

    /// Year-by-year return (%) used by the valuation scenario
    #[serde(default)]
    pub actual_annual_returns: Vec<Option<f64>>,

    /// Annual management fee (% of invested capital)
    pub management_fee: f64,

    /// Deal life in years; capital is returned in the final year
    pub timeline_years: u32,

    /// Annual preferred return hurdle (%)
    pub preferred_return: f64,

    pub gp_catch_up: GpCatchUp,
    pub first_tier: FirstTier,
    pub second_tier: SecondTier,
}

impl Deal {
    /// Total capital invested across participants
    pub fn investment(&self) -> f64 {
        self.participants.iter().map(|p| p.amount).sum()
    }

    /// Annual return (%) for a 1-indexed year under the given basis
    pub fn return_for_year(&self, year: u32, basis: ReturnBasis) -> f64 {
        match basis {
            ReturnBasis::Projected => self.projected_annual_return,
            ReturnBasis::Valuation => year
                .checked_sub(1)
                .and_then(|idx| self.actual_annual_returns.get(idx as usize))
                .copied()
                .flatten()
                .unwrap_or(0.0),
        }
    }

    /// Whether any year carries an actual return
    pub fn has_actual_returns(&self) -> bool {
        self.actual_annual_returns.iter().any(Option::is_some)
    }

    /// Whether `year` is the deal's final (capital-returning) year
    pub fn is_final_year(&self, year: u32) -> bool {
        year == self.timeline_years
    }

    /// Lower bound (%) of the first-tier band
    pub fn first_tier_floor(&self) -> f64 {
        if self.gp_catch_up.applies {
            self.gp_catch_up.hurdle
        } else {
            self.preferred_return
        }
    }
}

/// Investors and deals that make up one fund model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub investors: Vec<Investor>,
    #[serde(default)]
    pub deals: Vec<Deal>,
}

impl Portfolio {
    pub fn new(investors: Vec<Investor>, deals: Vec<Deal>) -> Self {
        Self { investors, deals }
    }

    /// Seed portfolio: two equal-carry GPs, two LPs, one five-year property deal
    pub fn sample() -> Self {
        let investors = vec![
            Investor::general("gp1", "Abhi", 50.0),
            Investor::general("gp2", "Ovi", 50.0),
            Investor::limited("lp1", "Family Office", 1_000_000.0),
            Investor::limited("lp2", "Angel Investor", 500_000.0),
        ];

        let deals = vec![Deal {
            id: "deal1".to_string(),
            name: "Property Alpha".to_string(),
            is_active: true,
            participants: vec![
                Participant::new("lp1", 750_000.0),
                Participant::new("lp2", 250_000.0),
            ],
            projected_annual_return: 10.0,
            actual_annual_returns: vec![Some(15.0), Some(18.0), Some(25.0), Some(30.0), Some(10.0)],
            management_fee: 0.0,
            timeline_years: 5,
            preferred_return: 8.0,
            gp_catch_up: GpCatchUp { applies: true, percentage: 100.0, hurdle: 10.0 },
            first_tier: FirstTier { split: Split::new(80.0, 20.0), hurdle: 15.0 },
            second_tier: SecondTier { split: Split::new(60.0, 40.0) },
        }];

        Self { investors, deals }
    }

    pub fn investor(&self, id: &str) -> Option<&Investor> {
        self.investors.iter().find(|i| i.id == id)
    }

    pub fn limited_partners(&self) -> impl Iterator<Item = &Investor> {
        self.investors.iter().filter(|i| !i.is_gp())
    }

    pub fn general_partners(&self) -> impl Iterator<Item = &Investor> {
        self.investors.iter().filter(|i| i.is_gp())
    }

    /// Deals included in calculations, cloned in portfolio order
    pub fn active_deals(&self) -> Vec<Deal> {
        self.deals.iter().filter(|d| d.is_active).cloned().collect()
    }

    pub fn add_investor(&mut self, investor: Investor) {
        self.investors.push(investor);
    }

    /// Remove an investor together with every participation it holds
    pub fn remove_investor(&mut self, id: &str) -> Option<Investor> {
        let idx = self.investors.iter().position(|i| i.id == id)?;
        let removed = self.investors.remove(idx);
        for deal in &mut self.deals {
            deal.participants.retain(|p| p.investor_id != id);
        }
        Some(removed)
    }

    pub fn add_deal(&mut self, deal: Deal) {
        self.deals.push(deal);
    }

    pub fn remove_deal(&mut self, id: &str) -> Option<Deal> {
        let idx = self.deals.iter().position(|d| d.id == id)?;
        Some(self.deals.remove(idx))
    }

    /// Flip a deal's active flag, returning the new state
    pub fn toggle_deal_active(&mut self, id: &str) -> Option<bool> {
        let deal = self.deals.iter_mut().find(|d| d.id == id)?;
        deal.is_active = !deal.is_active;
        Some(deal.is_active)
    }
}
