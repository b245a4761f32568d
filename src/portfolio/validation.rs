//! Schema checks run by callers before handing a portfolio to the engine
//!
//! The engine accepts anything structurally valid and clamps degenerate
//! bands on its own. Hard errors here are inputs it would silently misread;
//! warnings are inputs it handles but that are probably mistakes.

use super::{Deal, InvestorRole, Portfolio, Split};
use crate::error::{Result, WaterfallError};
use log::warn;
use std::collections::{HashMap, HashSet};
use std::fmt;

const SPLIT_TOLERANCE: f64 = 1e-9;

/// Non-fatal finding about a portfolio
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// Hurdles are not strictly increasing; the affected band clamps to zero
    HurdleOrdering { deal_id: String, detail: String },
    /// Fewer actual returns than timeline years; missing years count as 0%
    ShortActualReturns { deal_id: String, provided: usize, timeline_years: u32 },
    /// LP has more capital deployed than committed
    OverCommitted { investor_id: String, allocated: f64, commitment: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::HurdleOrdering { deal_id, detail } => {
                write!(f, "deal {}: {}", deal_id, detail)
            }
            ValidationWarning::ShortActualReturns { deal_id, provided, timeline_years } => write!(
                f,
                "deal {}: {} actual returns for a {}-year timeline",
                deal_id, provided, timeline_years
            ),
            ValidationWarning::OverCommitted { investor_id, allocated, commitment } => write!(
                f,
                "investor {}: allocated {:.2} exceeds commitment {:.2}",
                investor_id, allocated, commitment
            ),
        }
    }
}

fn check_percentage(field: String, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(WaterfallError::invalid(field, format!("{} is outside [0, 100]", value)));
    }
    Ok(())
}

fn check_split(field: String, split: &Split) -> Result<()> {
    check_percentage(format!("{}.lp", field), split.lp)?;
    check_percentage(format!("{}.gp", field), split.gp)?;
    if (split.lp + split.gp - 100.0).abs() > SPLIT_TOLERANCE {
        return Err(WaterfallError::invalid(
            field,
            format!("lp {} + gp {} does not sum to 100", split.lp, split.gp),
        ));
    }
    Ok(())
}

fn check_deal(deal: &Deal, portfolio: &Portfolio) -> Result<()> {
    let field = |name: &str| format!("deals[{}].{}", deal.id, name);

    if deal.timeline_years == 0 {
        return Err(WaterfallError::invalid(field("timelineYears"), "must be at least 1"));
    }
    if !deal.projected_annual_return.is_finite() {
        return Err(WaterfallError::invalid(field("projectedAnnualReturn"), "must be finite"));
    }
    if let Some(bad) = deal.actual_annual_returns.iter().flatten().find(|r| !r.is_finite()) {
        return Err(WaterfallError::invalid(
            field("actualAnnualReturns"),
            format!("{} is not finite", bad),
        ));
    }

    check_percentage(field("managementFee"), deal.management_fee)?;
    check_percentage(field("preferredReturn"), deal.preferred_return)?;
    check_percentage(field("gpCatchUp.percentage"), deal.gp_catch_up.percentage)?;
    check_percentage(field("gpCatchUp.hurdle"), deal.gp_catch_up.hurdle)?;
    check_percentage(field("firstTier.hurdle"), deal.first_tier.hurdle)?;
    check_split(field("firstTier.split"), &deal.first_tier.split)?;
    check_split(field("secondTier.split"), &deal.second_tier.split)?;

    for participant in &deal.participants {
        if !participant.amount.is_finite() || participant.amount < 0.0 {
            return Err(WaterfallError::invalid(
                field("participants"),
                format!("{} has invalid amount {}", participant.investor_id, participant.amount),
            ));
        }
        match portfolio.investor(&participant.investor_id) {
            Some(investor) if !investor.is_gp() => {}
            _ => {
                return Err(WaterfallError::UnknownInvestor {
                    deal_id: deal.id.clone(),
                    investor_id: participant.investor_id.clone(),
                })
            }
        }
    }

    Ok(())
}

fn hurdle_warnings(deal: &Deal) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut push = |detail: String| {
        warnings.push(ValidationWarning::HurdleOrdering { deal_id: deal.id.clone(), detail });
    };

    if deal.gp_catch_up.applies {
        if deal.gp_catch_up.hurdle <= deal.preferred_return {
            push(format!(
                "catch-up hurdle {}% is not above preferred return {}%",
                deal.gp_catch_up.hurdle, deal.preferred_return
            ));
        }
        if deal.first_tier.hurdle <= deal.gp_catch_up.hurdle {
            push(format!(
                "first tier hurdle {}% is not above catch-up hurdle {}%",
                deal.first_tier.hurdle, deal.gp_catch_up.hurdle
            ));
        }
    } else if deal.first_tier.hurdle <= deal.preferred_return {
        push(format!(
            "first tier hurdle {}% is not above preferred return {}%",
            deal.first_tier.hurdle, deal.preferred_return
        ));
    }

    warnings
}

/// Validate a portfolio, returning warnings for suspicious but usable input
pub fn validate_portfolio(portfolio: &Portfolio) -> Result<Vec<ValidationWarning>> {
    let mut seen = HashSet::new();
    for investor in &portfolio.investors {
        if !seen.insert(investor.id.as_str()) {
            return Err(WaterfallError::DuplicateId { kind: "investor", id: investor.id.clone() });
        }
        match investor.role {
            InvestorRole::Limited { commitment } => {
                if !commitment.is_finite() || commitment < 0.0 {
                    return Err(WaterfallError::invalid(
                        format!("investors[{}].commitment", investor.id),
                        format!("{} must be non-negative", commitment),
                    ));
                }
            }
            InvestorRole::General { carry_percentage } => {
                check_percentage(
                    format!("investors[{}].gpCarryPercentage", investor.id),
                    carry_percentage,
                )?;
            }
        }
    }

    let mut seen = HashSet::new();
    for deal in &portfolio.deals {
        if !seen.insert(deal.id.as_str()) {
            return Err(WaterfallError::DuplicateId { kind: "deal", id: deal.id.clone() });
        }
    }

    let mut warnings = Vec::new();
    let mut allocated: HashMap<&str, f64> = HashMap::new();

    for deal in &portfolio.deals {
        check_deal(deal, portfolio)?;
        warnings.extend(hurdle_warnings(deal));

        if deal.actual_annual_returns.len() < deal.timeline_years as usize {
            warnings.push(ValidationWarning::ShortActualReturns {
                deal_id: deal.id.clone(),
                provided: deal.actual_annual_returns.len(),
                timeline_years: deal.timeline_years,
            });
        }

        if deal.is_active {
            for p in &deal.participants {
                *allocated.entry(p.investor_id.as_str()).or_insert(0.0) += p.amount;
            }
        }
    }

    for lp in portfolio.limited_partners() {
        let total = allocated.get(lp.id.as_str()).copied().unwrap_or(0.0);
        if let Some(commitment) = lp.commitment() {
            if total > commitment {
                warnings.push(ValidationWarning::OverCommitted {
                    investor_id: lp.id.clone(),
                    allocated: total,
                    commitment,
                });
            }
        }
    }

    for warning in &warnings {
        warn!("Portfolio validation: {}", warning);
    }

    Ok(warnings)
}
