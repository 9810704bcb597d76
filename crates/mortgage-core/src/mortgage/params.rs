//! Loan parameter types shared by every mortgage calculation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::time_value::{periodic_rate, PERIODS_PER_YEAR};
use crate::types::{Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Monthly housing costs paid alongside principal and interest.
///
/// These are summed into the all-in monthly payment but never amortized and
/// never reduce the loan balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringCosts {
    #[serde(default)]
    pub property_tax: Money,
    #[serde(default)]
    pub home_insurance: Money,
    /// Private mortgage insurance.
    #[serde(default)]
    pub mortgage_insurance: Money,
    /// Homeowners association dues.
    #[serde(default)]
    pub hoa_fees: Money,
}

impl RecurringCosts {
    /// Total monthly add-on cost.
    pub fn monthly_total(&self) -> Money {
        self.property_tax + self.home_insurance + self.mortgage_insurance + self.hoa_fees
    }

    fn validate(&self) -> MortgageResult<()> {
        let fields = [
            ("recurring_costs.property_tax", self.property_tax),
            ("recurring_costs.home_insurance", self.home_insurance),
            ("recurring_costs.mortgage_insurance", self.mortgage_insurance),
            ("recurring_costs.hoa_fees", self.hoa_fees),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(MortgageError::invalid(field, "Recurring cost cannot be negative"));
            }
        }
        Ok(())
    }
}

/// A single loan scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Scenario name, used in comparison output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Amount financed, after any down payment.
    pub principal: Money,
    /// Nominal annual rate as a percentage (6.5 = 6.5%).
    pub annual_rate_percent: Decimal,
    /// Number of monthly payments.
    pub term_months: u32,
    /// One-time finance charges (points, origination). Affects APR only.
    #[serde(default)]
    pub finance_fees: Money,
    #[serde(default)]
    pub recurring_costs: RecurringCosts,
    /// First day of the loan, used for payoff dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origination_date: Option<NaiveDate>,
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate_percent: Decimal, term_months: u32) -> Self {
        LoanParameters {
            label: None,
            principal,
            annual_rate_percent,
            term_months,
            finance_fees: Decimal::ZERO,
            recurring_costs: RecurringCosts::default(),
            origination_date: None,
        }
    }

    /// Build parameters from a term in whole years.
    pub fn from_years(principal: Money, annual_rate_percent: Decimal, term_years: u32) -> Self {
        Self::new(
            principal,
            annual_rate_percent,
            term_years.saturating_mul(PERIODS_PER_YEAR),
        )
    }

    /// Build parameters from floating-point inputs, as received from
    /// JavaScript or other float-typed callers. NaN, infinite, fractional
    /// or out-of-range values are rejected.
    pub fn from_f64(
        principal: f64,
        annual_rate_percent: f64,
        term_months: f64,
        finance_fees: f64,
    ) -> MortgageResult<Self> {
        let principal = decimal_from_f64("principal", principal)?;
        let rate = decimal_from_f64("annual_rate_percent", annual_rate_percent)?;
        let fees = decimal_from_f64("finance_fees", finance_fees)?;

        if !term_months.is_finite() || term_months.fract() != 0.0 {
            return Err(MortgageError::invalid(
                "term_months",
                "Term must be a finite whole number of months",
            ));
        }
        if term_months < 1.0 || term_months > f64::from(u32::MAX) {
            return Err(MortgageError::invalid(
                "term_months",
                "Term must be at least one month",
            ));
        }

        let mut params = Self::new(principal, rate, term_months as u32);
        params.finance_fees = fees;
        params.validate()?;
        Ok(params)
    }

    pub fn with_fees(mut self, finance_fees: Money) -> Self {
        self.finance_fees = finance_fees;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_recurring_costs(mut self, costs: RecurringCosts) -> Self {
        self.recurring_costs = costs;
        self
    }

    pub fn with_origination_date(mut self, date: NaiveDate) -> Self {
        self.origination_date = Some(date);
        self
    }

    /// Monthly decimal rate.
    pub fn periodic_rate(&self) -> Rate {
        periodic_rate(self.annual_rate_percent)
    }

    /// Reject mathematically degenerate inputs. Business ranges (maximum
    /// principal, rate caps) belong to the caller.
    pub fn validate(&self) -> MortgageResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "annual_rate_percent",
                "Annual rate cannot be negative",
            ));
        }
        if self.term_months == 0 {
            return Err(MortgageError::invalid(
                "term_months",
                "Term must be at least one month",
            ));
        }
        if self.finance_fees < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "finance_fees",
                "Finance fees cannot be negative",
            ));
        }
        self.recurring_costs.validate()
    }
}

fn decimal_from_f64(field: &str, value: f64) -> MortgageResult<Decimal> {
    if !value.is_finite() {
        return Err(MortgageError::invalid(field, "Value must be finite"));
    }
    Decimal::try_from(value)
        .map_err(|e| MortgageError::invalid(field, format!("Not representable as decimal: {e}")))
}
