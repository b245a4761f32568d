//! Investor and deal definitions, portfolio files and input validation

mod data;
pub mod loader;
pub mod validation;

pub use data::{
    Deal, FirstTier, GpCatchUp, Investor, InvestorRole, Participant, Portfolio, ReturnBasis,
    SecondTier, Split,
};
pub use loader::{load_portfolio, load_portfolio_from_reader, save_portfolio};
pub use validation::{validate_portfolio, ValidationWarning};
