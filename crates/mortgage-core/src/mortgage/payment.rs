//! Fixed monthly principal-and-interest payment.

use rust_decimal::Decimal;

use crate::mortgage::params::LoanParameters;
use crate::time_value::{level_payment, round_money};
use crate::types::Money;
use crate::MortgageResult;

/// Monthly P&I payment that fully amortizes the loan, rounded to cents
/// half away from zero.
pub fn compute_payment(params: &LoanParameters) -> MortgageResult<Money> {
    Ok(round_money(compute_payment_exact(params)?))
}

/// Unrounded monthly P&I payment.
///
/// A zero rate takes the straight-line branch `principal / term_months`.
pub fn compute_payment_exact(params: &LoanParameters) -> MortgageResult<Decimal> {
    params.validate()?;
    level_payment(params.principal, params.periodic_rate(), params.term_months)
}
