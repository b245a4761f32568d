//! Display formatting and CSV export for calculation results

use crate::error::Result;
use crate::projection::{CalculationOutput, LpPerformance, TierChartPoint, YearlyBreakdown};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Whole-dollar amount with thousands separators, e.g. `$1,080,000`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Decimal rate as a percentage with one decimal place
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub fn format_multiple(value: f64) -> String {
    format!("{:.2}x", value)
}

/// IRR for display; an undefined IRR is never shown as 0%
pub fn format_irr(irr: Option<f64>) -> String {
    irr.map(format_percent).unwrap_or_else(|| "N/A".to_string())
}

/// Flat LP row for CSV export (the per-deal breakdown is exported separately)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LpRow<'a> {
    investor_id: &'a str,
    name: &'a str,
    allocated: f64,
    distributions: f64,
    moic: f64,
    irr: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LpDealRow<'a> {
    investor_id: &'a str,
    deal_id: &'a str,
    deal_name: &'a str,
    investment: f64,
    distribution: f64,
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_yearly_breakdown<W: Write>(writer: W, rows: &[YearlyBreakdown]) -> Result<()> {
    write_rows(writer, rows)
}

pub fn write_tier_chart<W: Write>(writer: W, rows: &[TierChartPoint]) -> Result<()> {
    write_rows(writer, rows)
}

pub fn write_lp_performance<W: Write>(writer: W, lps: &[LpPerformance]) -> Result<()> {
    write_rows(
        writer,
        lps.iter().map(|lp| LpRow {
            investor_id: &lp.investor_id,
            name: &lp.name,
            allocated: lp.allocated,
            distributions: lp.distributions,
            moic: lp.moic,
            irr: lp.irr,
        }),
    )
}

pub fn write_lp_deal_breakdown<W: Write>(writer: W, lps: &[LpPerformance]) -> Result<()> {
    write_rows(
        writer,
        lps.iter().flat_map(|lp| {
            lp.deal_breakdown.iter().map(move |deal| LpDealRow {
                investor_id: &lp.investor_id,
                deal_id: &deal.deal_id,
                deal_name: &deal.deal_name,
                investment: deal.investment,
                distribution: deal.distribution,
            })
        }),
    )
}

/// Write every table of a scenario into `dir`, file names prefixed with `prefix`
pub fn write_scenario_csvs(output: &CalculationOutput, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let path = |name: &str| dir.join(format!("{}_{}.csv", prefix, name));

    let files = [
        path("yearly_breakdown"),
        path("annual_tiers"),
        path("cumulative_tiers"),
        path("lp_performance"),
        path("lp_deal_breakdown"),
    ];

    write_yearly_breakdown(File::create(&files[0])?, &output.yearly_breakdown)?;
    write_tier_chart(File::create(&files[1])?, &output.annual_distribution_chart_data)?;
    write_tier_chart(File::create(&files[2])?, &output.cumulative_tier_chart_data)?;
    write_lp_performance(File::create(&files[3])?, &output.lp_performance)?;
    write_lp_deal_breakdown(File::create(&files[4])?, &output.lp_performance)?;

    Ok(files.to_vec())
}

/// Plain-text summary tables for one scenario
pub fn render_summary(title: &str, output: &CalculationOutput) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, title, output)?;
    Ok(out)
}

fn write_summary(out: &mut String, title: &str, output: &CalculationOutput) -> fmt::Result {
    let summary = &output.summary_metrics;

    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out, "  Total LP Distributions:    {}", format_currency(summary.total_lp_distributions))?;
    writeln!(out, "  Total GP Earnings:         {}", format_currency(summary.total_gp_earnings))?;
    writeln!(out, "  Overall LP MOIC:           {}", format_multiple(summary.overall_lp_moic))?;
    writeln!(out, "  Portfolio LP IRR:          {}", format_irr(summary.portfolio_lp_irr))?;
    writeln!(out, "  Total GP Carried Interest: {}", format_currency(summary.total_gp_carried_interest))?;

    writeln!(out, "\n{:<24} {:>14} {:>14} {:>8} {:>8}", "LP", "Allocated", "Distributions", "MOIC", "IRR")?;
    writeln!(out, "{}", "-".repeat(72))?;
    for lp in &output.lp_performance {
        writeln!(
            out,
            "{:<24} {:>14} {:>14} {:>8} {:>8}",
            lp.name,
            format_currency(lp.allocated),
            format_currency(lp.distributions),
            format_multiple(lp.moic),
            format_irr(lp.irr),
        )?;
    }

    writeln!(out, "\n{:<24} {:>14} {:>14} {:>14}", "GP", "Mgmt Fees", "Carry", "Total")?;
    writeln!(out, "{}", "-".repeat(70))?;
    for gp in &output.gp_performance {
        writeln!(
            out,
            "{:<24} {:>14} {:>14} {:>14}",
            gp.name,
            format_currency(gp.management_fees),
            format_currency(gp.carried_interest),
            format_currency(gp.total_earnings),
        )?;
    }

    writeln!(out, "\n{:>4} {:>14} {:>14} {:>14} {:>14}", "Year", "Gross", "LP", "GP", "Total")?;
    writeln!(out, "{}", "-".repeat(64))?;
    for year in &output.yearly_breakdown {
        writeln!(
            out,
            "{:>4} {:>14} {:>14} {:>14} {:>14}",
            year.year,
            format_currency(year.gross_return),
            format_currency(year.lp_distributions),
            format_currency(year.gp_earnings),
            format_currency(year.total_distribution),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Portfolio;
    use crate::scenario::ScenarioRunner;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(1_080_000.49), "$1,080,000");
        assert_eq!(format_currency(123_456.5), "$123,457");
        assert_eq!(format_currency(-25_000.0), "-$25,000");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_percent(0.0856), "8.6%");
        assert_eq!(format_multiple(1.5), "1.50x");
        assert_eq!(format_irr(Some(0.1)), "10.0%");
        assert_eq!(format_irr(None), "N/A");
    }

    #[test]
    fn test_yearly_breakdown_csv() {
        let rows = vec![YearlyBreakdown {
            year: 1,
            gross_return: 100.0,
            lp_distributions: 80.0,
            gp_earnings: 20.0,
            total_distribution: 100.0,
        }];
        let mut buf = Vec::new();
        write_yearly_breakdown(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("year,grossReturn,lpDistributions,gpEarnings,totalDistribution"));
        assert_eq!(lines.next(), Some("1,100.0,80.0,20.0,100.0"));
    }

    #[test]
    fn test_lp_csv_leaves_undefined_irr_blank() {
        let mut portfolio = Portfolio::sample();
        portfolio.deals[0].participants.truncate(1);
        let output = ScenarioRunner::new().project_portfolio(&portfolio).projected;

        let mut buf = Vec::new();
        write_lp_performance(&mut buf, &output.lp_performance).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("investorId,name,allocated,distributions,moic,irr\n"));
        assert!(text.contains("lp2,Angel Investor,0.0,0.0,0.0,\n"));
    }

    #[test]
    fn test_render_summary() {
        let output = ScenarioRunner::new().project_portfolio(&Portfolio::sample()).projected;
        let text = render_summary("Projected", &output).unwrap();

        assert!(text.starts_with("Projected\n========="));
        assert!(text.contains("Overall LP MOIC:           1.40x"));
        assert!(text.contains("Family Office"));
        assert!(text.contains("$1,080,000"));
        assert!(text.contains("Mgmt Fees"));
        assert_eq!(text.lines().filter(|l| l.starts_with("Angel Investor")).count(), 1);
    }

    #[test]
    fn test_write_scenario_csvs() {
        let dir = std::env::temp_dir().join("waterfall_system_csv_test");
        let output = ScenarioRunner::new().project_portfolio(&Portfolio::sample()).valuation;
        let files = write_scenario_csvs(&output, &dir, "valuation").unwrap();

        assert_eq!(files.len(), 5);
        for file in &files {
            assert!(file.exists());
        }
        let deals = std::fs::read_to_string(&files[4]).unwrap();
        assert_eq!(deals.lines().count(), 3);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
