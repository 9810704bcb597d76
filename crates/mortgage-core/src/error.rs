use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid parameter: {field} — {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Negative amortization: payment {payment} does not cover first-period interest {first_interest}")]
    NegativeAmortization {
        payment: Decimal,
        first_interest: Decimal,
    },

    #[error("Convergence failure: APR solver did not converge after {iterations} iterations (best estimate: {best_estimate}, residual: {residual})")]
    NonConvergence {
        iterations: u32,
        best_estimate: Decimal,
        residual: Decimal,
    },

    #[error("Insufficient scenarios: comparison needs at least 2 loans, got {supplied}")]
    InsufficientScenarios { supplied: usize },

    #[error("Date error: {0}")]
    DateError(String),
}

impl MortgageError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MortgageError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
