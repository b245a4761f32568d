//! Internal Rate of Return (IRR) calculation
//!
//! Used for LP performance over annual distribution cashflows

use log::{trace, warn};

/// Newton-Raphson solver parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSettings {
    /// Starting rate for the iteration
    pub initial_guess: f64,
    /// |NPV| below which iteration stops early
    pub tolerance: f64,
    /// Looser |NPV| bound accepted after the iteration cap is hit
    pub acceptance_tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            initial_guess: 0.10,
            tolerance: 1e-6,
            acceptance_tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

/// Calculate the annual IRR of a cashflow series using the Newton-Raphson method.
///
/// # Arguments
/// * `cashflows` - Signed annual cashflows, index 0 being the initial investment
///
/// # Returns
/// * `Option<f64>` - IRR as a decimal (e.g., 0.10 for 10%), or None when there is
///   no initial investment or the iteration did not converge
pub fn calculate_irr(cashflows: &[f64], settings: &IrrSettings) -> Option<f64> {
    match cashflows.first() {
        Some(&first) if first < 0.0 => {}
        _ => return None, // No investment or no cashflows
    }

    let mut rate = settings.initial_guess;

    for iteration in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);
        trace!("IRR iteration {}: rate={:.8} npv={:.8}", iteration, rate, npv);

        if npv.abs() < settings.tolerance {
            return Some(rate);
        }
        if dnpv == 0.0 {
            break;
        }

        rate -= npv / dnpv;
    }

    // Last-chance acceptance at the looser tolerance
    let final_npv = npv_at_rate(cashflows, rate);
    if final_npv.abs() < settings.acceptance_tolerance {
        Some(rate)
    } else {
        warn!("IRR did not converge (rate={}, npv={})", rate, final_npv);
        None
    }
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
    }

    (npv, dnpv)
}

/// Calculate NPV at a given annual rate
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_three_year_compounding() {
        let irr = calculate_irr(&[-100.0, 0.0, 0.0, 133.1], &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-4);
    }

    #[test]
    fn test_level_distributions() {
        // 1,000,000 in, 80k for four years, 1,080,000 in year five -> 8%
        let cashflows = [-1_000_000.0, 80_000.0, 80_000.0, 80_000.0, 80_000.0, 1_080_000.0];
        let irr = calculate_irr(&cashflows, &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.08, epsilon = 1e-6);
    }

    #[test]
    fn test_no_investment_is_undefined() {
        let settings = IrrSettings::default();
        assert_eq!(calculate_irr(&[], &settings), None);
        assert_eq!(calculate_irr(&[0.0, 10.0], &settings), None);
        assert_eq!(calculate_irr(&[100.0, -110.0], &settings), None);
    }

    #[test]
    fn test_total_loss_does_not_converge() {
        // NPV is -100 at every rate, so no root exists
        assert_eq!(calculate_irr(&[-100.0, 0.0, 0.0], &IrrSettings::default()), None);
    }

    #[test]
    fn test_zero_derivative_stops_iteration() {
        // A single negative flow has dNPV = 0 everywhere
        assert_eq!(calculate_irr(&[-50.0], &IrrSettings::default()), None);
    }

    #[test]
    fn test_break_even_is_zero_rate() {
        let irr = calculate_irr(&[-100.0, 100.0], &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_iteration_cap_respected() {
        let settings = IrrSettings { max_iterations: 0, ..Default::default() };
        // Zero iterations: the initial guess is checked against the loose tolerance only
        assert_eq!(calculate_irr(&[-100.0, 0.0, 0.0, 133.1], &settings), Some(0.10));
        assert_eq!(calculate_irr(&[-100.0, 0.0, 0.0, 150.0], &settings), None);
    }

    #[test]
    fn test_npv_at_rate() {
        assert_abs_diff_eq!(npv_at_rate(&[-100.0, 110.0], 0.10), 0.0, epsilon = 1e-12);
    }
}
