//! Waterfall System - Deal-by-deal distribution waterfall engine for private investment funds
//!
//! This library provides:
//! - Investor and deal modeling with JSON portfolio files and validation
//! - Annual tier resolution (management fee, preferred return, GP catch-up, profit tiers)
//! - Projected and valuation scenario runs with isolated accrual state
//! - LP/GP performance metrics (MOIC, IRR) and portfolio summaries
//! - Parallel return-sensitivity sweeps and CSV reporting

pub mod error;
pub mod portfolio;
pub mod projection;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::{Result, WaterfallError};
pub use portfolio::{Deal, Investor, Participant, Portfolio, ReturnBasis};
pub use projection::{CalculationOutput, IrrSettings, ProjectionConfig, Projections, ScenarioEngine};
pub use scenario::{ScenarioRunner, SensitivityPoint};
