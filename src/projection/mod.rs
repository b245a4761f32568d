//! Waterfall projection: tier resolution, the annual scenario loop and
//! performance metrics

mod state;
mod engine;
mod cashflows;
mod tiers;
mod performance;
pub mod irr;

pub use state::AccrualState;
pub use engine::{ScenarioEngine, ProjectionConfig, CarrySplit};
pub use cashflows::{
    cumulative_series, CalculationOutput, CumulativeReturnPoint, GpPerformance, LpDealPerformance,
    LpPerformance, Projections, SummaryMetrics, TierChartPoint, YearlyBreakdown,
};
pub use tiers::{resolve_year, ParticipantDistribution, TierAllocation};
pub use performance::{moic, summarize, GpLedger, LpLedger};
pub use irr::{calculate_irr, IrrSettings};
