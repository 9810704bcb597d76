//! Annual Percentage Rate with upfront finance fees.
//!
//! The APR is the rate at which the loan's level payment stream discounts
//! back to the net proceeds actually received (principal less fees). It is
//! found with Newton-Raphson on the monthly rate, using the closed-form
//! derivative of the annuity present value.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MortgageError;
use crate::mortgage::params::LoanParameters;
use crate::mortgage::payment::compute_payment_exact;
use crate::time_value::{annual_percent, present_value, present_value_derivative};
use crate::types::{Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Present-value gap, in currency units, below which the solver stops.
const DEFAULT_TOLERANCE: Decimal = dec!(0.0001);
const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Monthly iterates outside `(MIN_MONTHLY_RATE, MAX_MONTHLY_RATE]` are
/// treated as divergence.
const MIN_MONTHLY_RATE: Rate = dec!(-0.99);
const MAX_MONTHLY_RATE: Rate = dec!(1.0);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Newton-Raphson tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AprSolverConfig {
    /// Stop once |PV(payments) - net proceeds| falls below this amount.
    pub tolerance: Money,
    /// Hard cap on Newton updates.
    pub max_iterations: u32,
}

impl Default for AprSolverConfig {
    fn default() -> Self {
        AprSolverConfig {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Result of the APR search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AprOutcome {
    /// The present-value gap met the tolerance.
    Converged { apr_percent: Decimal, iterations: u32 },
    /// The iteration budget ran out. `best_estimate_percent` is the last
    /// iterate and should not be trusted without inspection.
    DidNotConverge {
        best_estimate_percent: Decimal,
        iterations: u32,
        residual: Money,
    },
}

impl AprOutcome {
    /// APR as an annual percentage, converged or not.
    pub fn apr_percent(&self) -> Decimal {
        match self {
            AprOutcome::Converged { apr_percent, .. } => *apr_percent,
            AprOutcome::DidNotConverge {
                best_estimate_percent,
                ..
            } => *best_estimate_percent,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, AprOutcome::Converged { .. })
    }

    pub fn iterations(&self) -> u32 {
        match self {
            AprOutcome::Converged { iterations, .. }
            | AprOutcome::DidNotConverge { iterations, .. } => *iterations,
        }
    }

    /// The converged APR, or a [`MortgageError::NonConvergence`] error.
    pub fn require_converged(self) -> MortgageResult<Decimal> {
        match self {
            AprOutcome::Converged { apr_percent, .. } => Ok(apr_percent),
            AprOutcome::DidNotConverge {
                best_estimate_percent,
                iterations,
                residual,
            } => Err(MortgageError::NonConvergence {
                iterations,
                best_estimate: best_estimate_percent,
                residual,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve for the APR with the default solver configuration.
pub fn solve_apr(params: &LoanParameters) -> MortgageResult<AprOutcome> {
    solve_apr_with(params, &AprSolverConfig::default())
}

/// Solve for the APR.
///
/// With no finance fees the nominal rate is returned unchanged. Fees equal
/// to or above the principal are rejected. A zero derivative, arithmetic
/// overflow, or an iterate leaving the plausible rate range fails with
/// [`MortgageError::NonConvergence`]; running out of iterations is reported
/// through [`AprOutcome::DidNotConverge`] instead.
pub fn solve_apr_with(
    params: &LoanParameters,
    config: &AprSolverConfig,
) -> MortgageResult<AprOutcome> {
    params.validate()?;
    validate_config(config)?;

    if params.finance_fees.is_zero() {
        return Ok(AprOutcome::Converged {
            apr_percent: params.annual_rate_percent,
            iterations: 0,
        });
    }

    if params.finance_fees >= params.principal {
        return Err(MortgageError::invalid(
            "finance_fees",
            "Finance fees must be less than the principal",
        ));
    }

    // Unrounded: PV at the nominal rate is exactly the principal.
    let payment = compute_payment_exact(params)?;
    let net_proceeds = params.principal - params.finance_fees;
    let nper = params.term_months;
    let mut rate = params.periodic_rate();
    let mut residual = present_value(payment, rate, nper)? - net_proceeds;

    // `rate` and `residual` always describe the last iterate whose present
    // value was finite.
    for iteration in 0..config.max_iterations {
        debug!(iteration, %rate, %residual, "APR Newton step");

        if residual.abs() < config.tolerance {
            return Ok(AprOutcome::Converged {
                apr_percent: annual_percent(rate).normalize(),
                iterations: iteration,
            });
        }

        let slope = present_value_derivative(payment, rate, nper)
            .map_err(|_| diverged(iteration, rate, residual))?;
        if slope.is_zero() {
            return Err(diverged(iteration, rate, residual));
        }

        let next = residual
            .checked_div(slope)
            .and_then(|step| rate.checked_sub(step))
            .ok_or_else(|| diverged(iteration, rate, residual))?;
        if next <= MIN_MONTHLY_RATE || next > MAX_MONTHLY_RATE {
            return Err(diverged(iteration, rate, residual));
        }

        residual = present_value(payment, next, nper)
            .map_err(|_| diverged(iteration, rate, residual))?
            - net_proceeds;
        rate = next;
    }

    let best_estimate_percent = annual_percent(rate).normalize();

    warn!(
        iterations = config.max_iterations,
        best_estimate = %best_estimate_percent,
        %residual,
        "APR solver exhausted its iteration budget"
    );

    Ok(AprOutcome::DidNotConverge {
        best_estimate_percent,
        iterations: config.max_iterations,
        residual,
    })
}

fn validate_config(config: &AprSolverConfig) -> MortgageResult<()> {
    if config.tolerance <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "tolerance",
            "Solver tolerance must be positive",
        ));
    }
    if config.max_iterations == 0 {
        return Err(MortgageError::invalid(
            "max_iterations",
            "Solver needs at least one iteration",
        ));
    }
    Ok(())
}

fn diverged(iterations: u32, rate: Rate, residual: Money) -> MortgageError {
    warn!(iterations, %rate, %residual, "APR solver diverged");
    MortgageError::NonConvergence {
        iterations,
        best_estimate: annual_percent(rate).normalize(),
        residual,
    }
}
