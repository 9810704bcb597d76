pub mod amortization;
pub mod params;
pub mod payment;

#[cfg(feature = "apr")]
pub mod apr;

#[cfg(feature = "summary")]
pub mod comparison;

#[cfg(feature = "summary")]
pub mod summary;

pub use params::{LoanParameters, RecurringCosts};
