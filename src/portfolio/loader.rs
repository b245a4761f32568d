//! Load and save portfolio JSON files

use super::Portfolio;
use crate::error::Result;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default location of the bundled sample portfolio
pub const DEFAULT_PORTFOLIO_PATH: &str = "data/sample_portfolio.json";

/// Load a portfolio from a JSON file
pub fn load_portfolio<P: AsRef<Path>>(path: P) -> Result<Portfolio> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let portfolio = load_portfolio_from_reader(BufReader::new(file))?;
    info!(
        "Loaded {} investors and {} deals from {}",
        portfolio.investors.len(),
        portfolio.deals.len(),
        path.display()
    );
    Ok(portfolio)
}

/// Load a portfolio from any reader (e.g., stdin, string buffer)
pub fn load_portfolio_from_reader<R: Read>(reader: R) -> Result<Portfolio> {
    Ok(serde_json::from_reader(reader)?)
}

impl Portfolio {
    /// Parse a portfolio from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Write a portfolio as pretty-printed JSON
pub fn save_portfolio<P: AsRef<Path>>(portfolio: &Portfolio, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, portfolio)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
