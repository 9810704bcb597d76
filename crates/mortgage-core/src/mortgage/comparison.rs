//! Side-by-side comparison of loan scenarios and least-cost selection.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::MortgageError;
use crate::mortgage::params::LoanParameters;
use crate::mortgage::summary::{build_summary, LoanSummary};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Position in the input.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub monthly_payment: Money,
    pub apr_percent: Decimal,
    pub total_interest: Money,
    pub total_cost: Money,
    /// Extra cost relative to the cheapest scenario (zero for the best).
    pub cost_over_best: Money,
    pub summary: LoanSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    /// Scenarios in input order.
    pub scenarios: Vec<ComparisonEntry>,
    /// Index of the scenario with the lowest total cost.
    pub best_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_label: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarize every scenario and pick the cheapest by total cost.
pub fn compare_loans(
    scenarios: &[LoanParameters],
) -> MortgageResult<ComputationOutput<LoanComparison>> {
    let start = Instant::now();
    let (comparison, warnings) = build_comparison(scenarios, Utc::now().date_naive())?;
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Least total cost (principal + interest + fees), first scenario wins ties",
        &scenarios,
        warnings,
        elapsed,
        comparison,
    ))
}

/// Comparison with an explicit stand-in date for scenarios without an
/// origination date.
pub fn build_comparison(
    scenarios: &[LoanParameters],
    today: NaiveDate,
) -> MortgageResult<(LoanComparison, Vec<String>)> {
    if scenarios.len() < 2 {
        return Err(MortgageError::InsufficientScenarios {
            supplied: scenarios.len(),
        });
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut summaries = Vec::with_capacity(scenarios.len());
    for (index, params) in scenarios.iter().enumerate() {
        let (summary, scenario_warnings) = build_summary(params, today)?;
        let name = scenario_name(index, params);
        warnings.extend(scenario_warnings.into_iter().map(|w| format!("{name}: {w}")));
        summaries.push(summary);
    }

    let best_index = select_least_cost(&summaries)?;
    let best_cost = summaries[best_index].total_cost;

    debug!(scenarios = summaries.len(), best_index, %best_cost, "loan comparison complete");

    let best_label = summaries[best_index].label.clone();
    let entries = summaries
        .into_iter()
        .enumerate()
        .map(|(index, summary)| ComparisonEntry {
            index,
            label: summary.label.clone(),
            monthly_payment: summary.monthly_payment,
            apr_percent: summary.apr.apr_percent(),
            total_interest: summary.total_interest,
            total_cost: summary.total_cost,
            cost_over_best: summary.total_cost - best_cost,
            summary,
        })
        .collect();

    Ok((
        LoanComparison {
            scenarios: entries,
            best_index,
            best_label,
        },
        warnings,
    ))
}

/// Index of the summary with the minimum total cost. Ties keep the
/// earliest summary in input order.
pub fn select_least_cost(summaries: &[LoanSummary]) -> MortgageResult<usize> {
    if summaries.len() < 2 {
        return Err(MortgageError::InsufficientScenarios {
            supplied: summaries.len(),
        });
    }

    let mut best = 0;
    for (index, summary) in summaries.iter().enumerate().skip(1) {
        if summary.total_cost < summaries[best].total_cost {
            best = index;
        }
    }
    Ok(best)
}

fn scenario_name(index: usize, params: &LoanParameters) -> String {
    match &params.label {
        Some(label) => label.clone(),
        None => format!("scenario {}", index + 1),
    }
}
