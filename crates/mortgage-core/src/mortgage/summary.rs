//! Full loan report: payment, schedule totals, APR, payoff dates and
//! all-in monthly housing cost.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::mortgage::amortization::{
    annual_breakdown, generate_schedule, AmortizationEntry, AnnualSummary,
};
use crate::mortgage::apr::{solve_apr, AprOutcome};
use crate::mortgage::params::LoanParameters;
use crate::mortgage::payment::compute_payment;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    /// Fixed monthly principal and interest.
    pub monthly_payment: Money,
    pub apr: AprOutcome,
    /// Sum of scheduled interest.
    pub total_interest: Money,
    /// Sum of scheduled payments, equal to principal + total_interest.
    pub total_payments: Money,
    pub finance_fees: Money,
    /// principal + total_interest + finance_fees.
    pub total_cost: Money,
    /// total_interest / principal, as a percentage (2 dp).
    pub interest_to_principal_pct: Decimal,
    /// Taxes, insurance and dues added to each payment.
    pub monthly_recurring_costs: Money,
    /// Principal, interest, taxes and insurance.
    pub monthly_total_payment: Money,
    /// Recurring costs over the life of the schedule.
    pub total_recurring_costs: Money,
    /// Number of scheduled payments; below term_months when rounding pays
    /// the loan off early.
    pub number_of_payments: u32,
    pub origination_date: NaiveDate,
    /// Origination date plus the contractual term, in calendar months.
    pub payoff_date: NaiveDate,
    /// Origination date plus the number of scheduled payments.
    pub schedule_payoff_date: NaiveDate,
    pub annual_breakdown: Vec<AnnualSummary>,
    pub schedule: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarize a loan. Payoff dates are measured from the loan's
/// `origination_date`, or from today (UTC) when none is given.
pub fn summarize(params: &LoanParameters) -> MortgageResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    let (summary, warnings) = build_summary(params, Utc::now().date_naive())?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with Newton-Raphson APR",
        params,
        warnings,
        elapsed,
        summary,
    ))
}

/// Build the summary and its warnings. `today` stands in for a missing
/// origination date.
pub fn build_summary(
    params: &LoanParameters,
    today: NaiveDate,
) -> MortgageResult<(LoanSummary, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();

    let monthly_payment = compute_payment(params)?;
    let schedule = generate_schedule(params)?;
    let apr = solve_apr(params)?;

    if let AprOutcome::DidNotConverge {
        best_estimate_percent,
        iterations,
        ..
    } = &apr
    {
        warnings.push(format!(
            "APR did not converge after {iterations} iterations; \
             best estimate {best_estimate_percent}% is unreliable"
        ));
    }

    let total_interest: Money = schedule.iter().map(|e| e.interest).sum();
    let total_payments: Money = schedule.iter().map(|e| e.payment).sum();
    let total_cost = params.principal + total_interest + params.finance_fees;
    let interest_to_principal_pct = percent_of(total_interest, params.principal);

    let number_of_payments = schedule.len() as u32;
    let monthly_recurring_costs = params.recurring_costs.monthly_total();
    let monthly_total_payment = monthly_payment + monthly_recurring_costs;
    let total_recurring_costs = monthly_recurring_costs * Decimal::from(number_of_payments);

    let origination_date = match params.origination_date {
        Some(date) => date,
        None => {
            warnings.push(format!(
                "No origination date supplied; payoff dates are measured from {today}"
            ));
            today
        }
    };
    let payoff_date = add_months(origination_date, params.term_months)?;
    let schedule_payoff_date = add_months(origination_date, number_of_payments)?;

    if number_of_payments < params.term_months {
        warnings.push(format!(
            "Schedule pays off after {number_of_payments} of {} payments; \
             payoff date {payoff_date} follows the contractual term",
            params.term_months
        ));
    }

    let summary = LoanSummary {
        label: params.label.clone(),
        principal: params.principal,
        annual_rate_percent: params.annual_rate_percent,
        term_months: params.term_months,
        monthly_payment,
        apr,
        total_interest,
        total_payments,
        finance_fees: params.finance_fees,
        total_cost,
        interest_to_principal_pct,
        monthly_recurring_costs,
        monthly_total_payment,
        total_recurring_costs,
        number_of_payments,
        origination_date,
        payoff_date,
        schedule_payoff_date,
        annual_breakdown: annual_breakdown(&schedule),
        schedule,
    };

    Ok((summary, warnings))
}

/// `part / whole` as a percentage, 2 dp, half away from zero.
fn percent_of(part: Money, whole: Money) -> Decimal {
    (part / whole * dec!(100)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn add_months(date: NaiveDate, months: u32) -> MortgageResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        MortgageError::DateError(format!("{date} plus {months} months is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage::params::RecurringCosts;

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn standard_loan() -> LoanParameters {
        LoanParameters::new(dec!(300_000), dec!(6.5), 360)
            .with_fees(dec!(5_000))
            .with_origination_date(jan_2025())
    }

    #[test]
    fn test_totals_from_schedule() {
        let (s, warnings) = build_summary(&standard_loan(), jan_2025()).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(s.monthly_payment, dec!(1896.20));
        assert_eq!(s.total_interest, dec!(382636.71));
        assert_eq!(s.total_payments, dec!(682636.71));
        assert_eq!(s.total_payments, s.principal + s.total_interest);
        assert_eq!(s.total_cost, dec!(687636.71));
        assert_eq!(s.interest_to_principal_pct, dec!(127.55));
        assert_eq!(s.number_of_payments, 360);
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(dec!(1.125), dec!(100)), dec!(1.13));
        assert_eq!(percent_of(dec!(1.135), dec!(100)), dec!(1.14));
        assert_eq!(percent_of(dec!(1), dec!(3)), dec!(33.33));
    }

    #[test]
    fn test_total_interest_differs_from_naive_product() {
        let (s, _) = build_summary(&standard_loan(), jan_2025()).unwrap();
        let naive = s.monthly_payment * dec!(360) - s.principal;
        assert_ne!(s.total_interest, naive);
    }

    #[test]
    fn test_apr_included() {
        let (s, _) = build_summary(&standard_loan(), jan_2025()).unwrap();
        assert!(s.apr.is_converged());
        assert!(s.apr.apr_percent() > dec!(6.5));
    }

    #[test]
    fn test_payoff_date_from_origination() {
        let (s, _) = build_summary(&standard_loan(), jan_2025()).unwrap();
        assert_eq!(s.origination_date, jan_2025());
        assert_eq!(s.payoff_date, NaiveDate::from_ymd_opt(2055, 1, 15).unwrap());
        assert_eq!(s.schedule_payoff_date, s.payoff_date);
    }

    #[test]
    fn test_missing_origination_uses_today_with_warning() {
        let params = LoanParameters::from_years(dec!(200_000), dec!(5), 15);
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (s, warnings) = build_summary(&params, today).unwrap();
        assert_eq!(s.origination_date, today);
        // Calendar arithmetic clamps Feb 29 to Feb 28 in a common year.
        assert_eq!(s.payoff_date, NaiveDate::from_ymd_opt(2039, 2, 28).unwrap());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("origination date"));
    }

    #[test]
    fn test_recurring_costs_not_amortized() {
        let costs = RecurringCosts {
            property_tax: dec!(350),
            home_insurance: dec!(120),
            mortgage_insurance: dec!(95.50),
            hoa_fees: dec!(40),
        };
        let base = standard_loan();
        let with_costs = base.clone().with_recurring_costs(costs);

        let (plain, _) = build_summary(&base, jan_2025()).unwrap();
        let (s, _) = build_summary(&with_costs, jan_2025()).unwrap();

        assert_eq!(s.schedule, plain.schedule);
        assert_eq!(s.total_interest, plain.total_interest);
        assert_eq!(s.monthly_recurring_costs, dec!(605.50));
        assert_eq!(s.monthly_total_payment, dec!(2501.70));
        assert_eq!(s.total_recurring_costs, dec!(217980.00));
    }

    #[test]
    fn test_annual_breakdown_present() {
        let (s, _) = build_summary(&standard_loan(), jan_2025()).unwrap();
        assert_eq!(s.annual_breakdown.len(), 30);
        let interest: Decimal = s.annual_breakdown.iter().map(|y| y.interest_paid).sum();
        assert_eq!(interest, s.total_interest);
    }

    #[test]
    fn test_errors_propagate() {
        let params = LoanParameters::new(dec!(1_000), dec!(5), 12).with_fees(dec!(2_000));
        assert!(matches!(
            build_summary(&params, jan_2025()),
            Err(MortgageError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_summarize_envelope() {
        let out = summarize(&standard_loan()).unwrap();
        assert!(out.methodology.contains("amortization"));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert!(out.metadata.rounding.contains("half away from zero"));
        assert_eq!(out.assumptions["term_months"], 360);
        assert_eq!(out.result.monthly_payment, dec!(1896.20));
    }
}
