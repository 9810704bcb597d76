use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use mortgage_core::mortgage::apr::AprSolverConfig;
use mortgage_core::mortgage::LoanParameters;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_loan(input_json: &str) -> NapiResult<LoanParameters> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Payment and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_payment(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let payment =
        mortgage_core::mortgage::payment::compute_payment(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "monthly_payment": payment }))
        .map_err(to_napi_error)
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let schedule = mortgage_core::mortgage::amortization::generate_schedule(&loan)
        .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// APR
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AprRequest {
    #[serde(flatten)]
    loan: LoanParameters,
    #[serde(default)]
    solver: Option<AprSolverConfig>,
}

#[napi]
pub fn solve_apr(input_json: String) -> NapiResult<String> {
    let request: AprRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = request.solver.unwrap_or_default();
    let outcome = mortgage_core::mortgage::apr::solve_apr_with(&request.loan, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Summary and comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn summarize_loan(input_json: String) -> NapiResult<String> {
    let loan = parse_loan(&input_json)?;
    let output = mortgage_core::mortgage::summary::summarize(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_loans(input_json: String) -> NapiResult<String> {
    let loans: Vec<LoanParameters> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::mortgage::comparison::compare_loans(&loans).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
