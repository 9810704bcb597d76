//! Month-by-month amortization schedule.
//!
//! Each period's interest and principal are rounded to cents. Per-period
//! rounding drifts over long schedules, so the principal portion is clamped
//! to the outstanding balance on the final scheduled period, or earlier if
//! the regular split would overshoot. The last entry always ends at exactly
//! zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MortgageError;
use crate::mortgage::params::LoanParameters;
use crate::mortgage::payment::compute_payment_exact;
use crate::time_value::{round_money, PERIODS_PER_YEAR};
use crate::types::{Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One row of the amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based payment number.
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub ending_balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
}

/// Schedule totals for one loan year (periods 1-12 are year 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    pub ending_balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Unroll the fixed monthly payment into a full amortization schedule.
///
/// Fails with [`MortgageError::NegativeAmortization`] when the unrounded
/// payment does not exceed the unrounded first month's interest. When both
/// round to the same cent the principal portion stays at zero and the final
/// period retires the balance.
pub fn generate_schedule(params: &LoanParameters) -> MortgageResult<Vec<AmortizationEntry>> {
    let exact_payment = compute_payment_exact(params)?;
    let rate = params.periodic_rate();
    let accrued = params.principal * rate;
    if exact_payment <= accrued {
        return Err(MortgageError::NegativeAmortization {
            payment: exact_payment,
            first_interest: accrued,
        });
    }
    build_schedule(
        params.principal,
        rate,
        params.term_months,
        round_money(exact_payment),
    )
}

/// Unroll an explicit payment amount over at most `term_months` periods.
///
/// A payment below the first month's rounded interest is rejected.
pub(crate) fn build_schedule(
    principal: Money,
    rate: Rate,
    term_months: u32,
    payment: Money,
) -> MortgageResult<Vec<AmortizationEntry>> {
    let first_interest = round_money(principal * rate);
    if payment < first_interest {
        return Err(MortgageError::NegativeAmortization {
            payment,
            first_interest,
        });
    }

    let mut schedule = Vec::with_capacity(term_months as usize);
    let mut balance = principal;
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;

    for period in 1..=term_months {
        let interest = round_money(balance * rate);
        let mut principal_portion = round_money(payment - interest);

        if period == term_months || principal_portion > balance {
            principal_portion = balance;
        }

        balance = round_money(balance - principal_portion);
        cumulative_principal += principal_portion;
        cumulative_interest += interest;

        schedule.push(AmortizationEntry {
            period,
            payment: principal_portion + interest,
            principal: principal_portion,
            interest,
            ending_balance: balance,
            cumulative_principal,
            cumulative_interest,
        });

        if balance <= Decimal::ZERO {
            break;
        }
    }

    debug!(
        periods = schedule.len(),
        term_months,
        %payment,
        total_interest = %cumulative_interest,
        "amortization schedule built"
    );

    Ok(schedule)
}

/// Roll a schedule up into loan-year totals.
pub fn annual_breakdown(schedule: &[AmortizationEntry]) -> Vec<AnnualSummary> {
    schedule
        .chunks(PERIODS_PER_YEAR as usize)
        .zip(1u32..)
        .map(|(months, year)| {
            let principal_paid: Money = months.iter().map(|e| e.principal).sum();
            let interest_paid: Money = months.iter().map(|e| e.interest).sum();
            AnnualSummary {
                year,
                principal_paid,
                interest_paid,
                total_paid: principal_paid + interest_paid,
                ending_balance: months
                    .last()
                    .map(|e| e.ending_balance)
                    .unwrap_or_default(),
            }
        })
        .collect()
}
