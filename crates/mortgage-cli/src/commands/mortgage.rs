use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::debug;

use mortgage_core::mortgage::amortization;
use mortgage_core::mortgage::apr::{self, AprSolverConfig};
use mortgage_core::mortgage::comparison;
use mortgage_core::mortgage::payment;
use mortgage_core::mortgage::summary;
use mortgage_core::mortgage::{LoanParameters, RecurringCosts};

use crate::input;

/// Loan definition shared by the single-loan subcommands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed, after down payment
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a percentage (e.g. 6.5 for 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, conflicts_with = "term_years")]
    pub term_months: Option<u32>,

    /// Term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// One-time finance fees (points, origination)
    #[arg(long)]
    pub fees: Option<Decimal>,

    /// Monthly property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Monthly homeowners insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly mortgage insurance (PMI)
    #[arg(long)]
    pub pmi: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Loan origination date (YYYY-MM-DD)
    #[arg(long)]
    pub origination_date: Option<NaiveDate>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Roll the schedule up into loan years
    #[arg(long)]
    pub annual: bool,
}

/// Arguments for the APR solver
#[derive(Args)]
pub struct AprArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Present-value tolerance in currency units
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Maximum Newton-Raphson iterations
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Fail instead of reporting an unconverged estimate
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for loan comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON file holding an array of loans
    #[arg(long)]
    pub input: Option<String>,
}

fn resolve_loan(args: LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    if let Some(loan) = input::load(args.input.as_deref())? {
        return Ok(loan);
    }

    let principal = args
        .principal
        .ok_or("--principal is required (or provide --input)")?;
    let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
    let mut loan = match (args.term_months, args.term_years) {
        (Some(months), _) => LoanParameters::new(principal, rate, months),
        (None, Some(years)) => LoanParameters::from_years(principal, rate, years),
        (None, None) => {
            return Err("--term-months or --term-years is required (or provide --input)".into())
        }
    };

    loan.finance_fees = args.fees.unwrap_or_default();
    loan.recurring_costs = RecurringCosts {
        property_tax: args.property_tax.unwrap_or_default(),
        home_insurance: args.insurance.unwrap_or_default(),
        mortgage_insurance: args.pmi.unwrap_or_default(),
        hoa_fees: args.hoa.unwrap_or_default(),
    };
    loan.origination_date = args.origination_date;
    Ok(loan)
}

pub fn run_payment(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    let monthly_payment = payment::compute_payment(&loan)?;
    let recurring = loan.recurring_costs.monthly_total();
    Ok(json!({
        "result": {
            "monthly_payment": monthly_payment,
            "monthly_recurring_costs": recurring,
            "monthly_total_payment": monthly_payment + recurring,
            "principal": loan.principal,
            "annual_rate_percent": loan.annual_rate_percent,
            "term_months": loan.term_months,
        }
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args.loan)?;
    let schedule = amortization::generate_schedule(&loan)?;
    debug!(periods = schedule.len(), "schedule generated");
    if args.annual {
        Ok(serde_json::to_value(amortization::annual_breakdown(&schedule))?)
    } else {
        Ok(serde_json::to_value(schedule)?)
    }
}

pub fn run_apr(args: AprArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args.loan)?;
    let defaults = AprSolverConfig::default();
    let config = AprSolverConfig {
        tolerance: args.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: args.max_iterations.unwrap_or(defaults.max_iterations),
    };
    let outcome = apr::solve_apr_with(&loan, &config)?;
    if args.strict {
        let apr_percent = outcome.require_converged()?;
        return Ok(json!({ "result": { "apr_percent": apr_percent } }));
    }
    Ok(json!({ "result": outcome }))
}

pub fn run_summary(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = resolve_loan(args)?;
    let result = summary::summarize(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans: Vec<LoanParameters> = input::load(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for loan comparison")?;
    let result = comparison::compare_loans(&loans)?;
    Ok(serde_json::to_value(result)?)
}
