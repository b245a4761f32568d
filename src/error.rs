//! Error types for portfolio loading, validation and export
//!
//! The calculation core itself never fails: degenerate inputs produce
//! sentinel values (zero distributions, `None` IRR). These errors cover the
//! surfaces around it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaterfallError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Deal {deal_id} references unknown limited partner {investor_id}")]
    UnknownInvestor { deal_id: String, investor_id: String },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl WaterfallError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WaterfallError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WaterfallError>;
