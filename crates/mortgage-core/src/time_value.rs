//! Level-payment annuity math shared by the payment calculator, the
//! amortization engine and the APR solver.
//!
//! Every power is taken with checked arithmetic so an overflowing growth
//! factor surfaces as an error instead of a wrapped or saturated number.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Payment periods per year. Only monthly schedules are supported.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Minor-unit precision of the currency (cents).
pub const MONEY_DP: u32 = 2;

/// Round a monetary amount to cents, half away from zero (0.005 -> 0.01).
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an annual percentage (4.5 = 4.5%) to a monthly decimal rate.
pub fn periodic_rate(annual_rate_percent: Decimal) -> Rate {
    annual_rate_percent / dec!(100) / Decimal::from(PERIODS_PER_YEAR)
}

/// Convert a monthly decimal rate back to an annual percentage.
pub fn annual_percent(periodic: Rate) -> Decimal {
    periodic * Decimal::from(PERIODS_PER_YEAR) * dec!(100)
}

/// `(1 + rate)^nper`, failing on overflow.
pub fn growth_factor(rate: Rate, nper: u32) -> MortgageResult<Decimal> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    one_plus_r
        .checked_powi(i64::from(nper))
        .filter(|f| !f.is_zero())
        .ok_or_else(|| {
            MortgageError::invalid(
                "annual_rate_percent",
                format!("(1 + {rate})^{nper} overflows the annuity formula"),
            )
        })
}

/// Unrounded level payment that amortizes `principal` over `nper` periods.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> MortgageResult<Money> {
    if nper == 0 {
        return Err(MortgageError::invalid(
            "term_months",
            "Number of periods must be > 0",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(MortgageError::invalid(
            "annual_rate_percent",
            "Rate too small to distinguish from zero over the term",
        ));
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| MortgageError::invalid("principal", "Payment calculation overflows"))
}

/// Present value of `nper` level payments discounted at `rate` per period.
///
/// At `rate == 0` this is the limit `pmt * nper`.
pub fn present_value(pmt: Money, rate: Rate, nper: u32) -> MortgageResult<Money> {
    if rate.is_zero() {
        return Ok(pmt * Decimal::from(nper));
    }

    let factor = growth_factor(rate, nper)?;
    let discount = Decimal::ONE / factor;
    (Decimal::ONE - discount)
        .checked_div(rate)
        .and_then(|annuity| pmt.checked_mul(annuity))
        .ok_or_else(|| MortgageError::invalid("rate", "Present value overflows"))
}

/// Derivative of [`present_value`] with respect to `rate`.
///
/// `pmt * (n r (1+r)^(-n-1) - (1 - (1+r)^-n)) / r^2`, with the limit
/// `-pmt * n (n + 1) / 2` at `rate == 0`.
pub fn present_value_derivative(pmt: Money, rate: Rate, nper: u32) -> MortgageResult<Decimal> {
    let n = Decimal::from(nper);

    if rate.is_zero() {
        return Ok(-pmt * n * (n + Decimal::ONE) / dec!(2));
    }

    let factor = growth_factor(rate, nper)?;
    let discount = Decimal::ONE / factor;
    let discount_next = discount / (Decimal::ONE + rate);

    let numerator = n * rate * discount_next - (Decimal::ONE - discount);
    rate.checked_mul(rate)
        .and_then(|r2| numerator.checked_div(r2))
        .and_then(|d| d.checked_mul(pmt))
        .ok_or_else(|| MortgageError::invalid("rate", "Present value derivative overflows"))
}
