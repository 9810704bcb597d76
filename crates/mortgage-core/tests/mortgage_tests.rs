use chrono::NaiveDate;
use mortgage_core::mortgage::amortization::{self, AmortizationEntry};
use mortgage_core::mortgage::apr::{self, AprOutcome};
use mortgage_core::mortgage::comparison;
use mortgage_core::mortgage::payment;
use mortgage_core::mortgage::summary;
use mortgage_core::mortgage::LoanParameters;
use mortgage_core::MortgageError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const CENT: Decimal = dec!(0.01);

fn origination() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

/// A spread of loans covering short, long, zero-rate and high-rate terms,
/// up to 50% over 50 years.
fn loan_grid() -> Vec<LoanParameters> {
    let mut loans = Vec::new();
    let principals = [
        dec!(0.30),
        dec!(1_000),
        dec!(5_000),
        dec!(77_777.77),
        dec!(85_500.55),
        dec!(300_000),
        dec!(1_250_000),
    ];
    let rates = [
        dec!(0),
        dec!(2.125),
        dec!(4.5),
        dec!(6.5),
        dec!(9.99),
        dec!(18),
        dec!(19),
        dec!(34),
        dec!(45),
        dec!(50),
    ];
    for principal in principals {
        for rate in rates {
            for months in [1, 12, 61, 180, 360, 480, 600] {
                loans.push(LoanParameters::new(principal, rate, months));
            }
        }
    }
    loans
}

fn assert_schedule_invariants(params: &LoanParameters, schedule: &[AmortizationEntry]) {
    let last = schedule.last().expect("schedule should not be empty");
    assert_eq!(last.ending_balance, Decimal::ZERO, "{params:?}");
    assert!(schedule.len() <= params.term_months as usize);

    let total_principal: Decimal = schedule.iter().map(|e| e.principal).sum();
    assert!(
        (total_principal - params.principal).abs() <= CENT,
        "principal not conserved for {params:?}: {total_principal}"
    );

    let mut prev = params.principal;
    for (i, e) in schedule.iter().enumerate() {
        assert_eq!(e.period as usize, i + 1);
        assert!(
            (e.payment - (e.principal + e.interest)).abs() <= CENT,
            "payment decomposition at period {}",
            e.period
        );
        assert!(e.ending_balance <= prev, "balance increased at period {}", e.period);
        prev = e.ending_balance;
    }
}

// ===========================================================================
// Payment
// ===========================================================================

#[test]
fn test_scenario_30yr_4_5pct_payment_and_schedule() {
    let params = LoanParameters::new(dec!(300_000), dec!(4.5), 360);
    assert_eq!(payment::compute_payment(&params).unwrap(), dec!(1520.06));

    let schedule = amortization::generate_schedule(&params).unwrap();
    assert_eq!(schedule.len(), 360);
    assert_eq!(schedule.last().unwrap().ending_balance, Decimal::ZERO);
    assert_schedule_invariants(&params, &schedule);
}

#[test]
fn test_scenario_zero_rate_straight_line() {
    let params = LoanParameters::new(dec!(100_000), Decimal::ZERO, 120);
    assert_eq!(payment::compute_payment(&params).unwrap(), dec!(833.33));

    let schedule = amortization::generate_schedule(&params).unwrap();
    assert_eq!(schedule.len(), 120);
    assert!(schedule.iter().all(|e| e.interest == Decimal::ZERO));
    assert_schedule_invariants(&params, &schedule);
}

#[test]
fn test_zero_rate_payment_matches_division_for_grid() {
    for months in [1u32, 7, 12, 120, 360] {
        let principal = dec!(98_765.43);
        let params = LoanParameters::new(principal, Decimal::ZERO, months);
        let expected = (principal / Decimal::from(months))
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        assert_eq!(payment::compute_payment(&params).unwrap(), expected);
    }
}

#[test]
fn test_invalid_parameters_are_typed_errors() {
    let bad = [
        LoanParameters::new(Decimal::ZERO, dec!(5), 360),
        LoanParameters::new(dec!(-100), dec!(5), 360),
        LoanParameters::new(dec!(100_000), dec!(5), 0),
        LoanParameters::new(dec!(100_000), dec!(-1), 360),
    ];
    for params in &bad {
        assert!(
            matches!(
                payment::compute_payment(params),
                Err(MortgageError::InvalidParameter { .. })
            ),
            "{params:?}"
        );
        assert!(matches!(
            amortization::generate_schedule(params),
            Err(MortgageError::InvalidParameter { .. })
        ));
    }
}

// ===========================================================================
// Amortization
// ===========================================================================

#[test]
fn test_schedule_invariants_across_grid() {
    for params in loan_grid() {
        let schedule = amortization::generate_schedule(&params).unwrap();
        assert_schedule_invariants(&params, &schedule);
    }
}

#[test]
fn test_scenario_single_month_high_rate() {
    let params = LoanParameters::new(dec!(1_000), dec!(50), 1);
    let schedule = amortization::generate_schedule(&params).unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].principal, dec!(1_000));
    assert_eq!(schedule[0].ending_balance, Decimal::ZERO);
}

#[test]
fn test_cumulative_columns_track_running_sums() {
    let params = LoanParameters::new(dec!(175_000), dec!(5.125), 240);
    let schedule = amortization::generate_schedule(&params).unwrap();
    let mut principal = Decimal::ZERO;
    let mut interest = Decimal::ZERO;
    for e in &schedule {
        principal += e.principal;
        interest += e.interest;
        assert_eq!(e.cumulative_principal, principal);
        assert_eq!(e.cumulative_interest, interest);
    }
}

// ===========================================================================
// APR
// ===========================================================================

#[test]
fn test_scenario_apr_without_fees_is_nominal() {
    let params = LoanParameters::new(dec!(300_000), dec!(6.5), 360);
    let outcome = apr::solve_apr(&params).unwrap();
    assert_eq!(outcome.apr_percent(), dec!(6.5));
    assert!(outcome.is_converged());
}

#[test]
fn test_scenario_apr_with_fees_converges_above_nominal() {
    let params = LoanParameters::new(dec!(300_000), dec!(6.5), 360).with_fees(dec!(5_000));
    match apr::solve_apr(&params).unwrap() {
        AprOutcome::Converged {
            apr_percent,
            iterations,
        } => {
            assert!(apr_percent > dec!(6.5));
            assert!(iterations <= 100);
        }
        other => panic!("Expected convergence, got {other:?}"),
    }
}

#[test]
fn test_apr_above_nominal_for_any_positive_fee() {
    for fee in [dec!(1), dec!(750), dec!(3_000), dec!(12_500)] {
        for rate in [dec!(0), dec!(3), dec!(7.875)] {
            let params = LoanParameters::new(dec!(250_000), rate, 360).with_fees(fee);
            let apr = apr::solve_apr(&params).unwrap().require_converged().unwrap();
            assert!(apr > rate, "fee {fee} rate {rate} gave APR {apr}");
        }
    }
}

#[test]
fn test_larger_fees_give_higher_apr() {
    let low = LoanParameters::new(dec!(300_000), dec!(6), 360).with_fees(dec!(2_000));
    let high = low.clone().with_fees(dec!(8_000));
    let low_apr = apr::solve_apr(&low).unwrap().apr_percent();
    let high_apr = apr::solve_apr(&high).unwrap().apr_percent();
    assert!(high_apr > low_apr);
}

// ===========================================================================
// Summary and comparison
// ===========================================================================

#[test]
fn test_summary_is_deterministic() {
    let params = LoanParameters::new(dec!(412_000), dec!(6.99), 360)
        .with_fees(dec!(4_120))
        .with_origination_date(origination());
    let (first, _) = summary::build_summary(&params, origination()).unwrap();
    let (second, _) = summary::build_summary(&params, origination()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_scenario_engineered_tie_selects_first() {
    let a = LoanParameters::new(dec!(490_000), Decimal::ZERO, 360)
        .with_fees(dec!(10_000))
        .with_label("A")
        .with_origination_date(origination());
    let b = LoanParameters::new(dec!(500_000), Decimal::ZERO, 180)
        .with_label("B")
        .with_origination_date(origination());

    let output = comparison::compare_loans(&[a, b]).unwrap();
    let cmp = &output.result;
    assert_eq!(cmp.scenarios[0].total_cost, dec!(500_000));
    assert_eq!(cmp.scenarios[1].total_cost, dec!(500_000));
    assert_eq!(cmp.best_index, 0);
    assert_eq!(cmp.best_label.as_deref(), Some("A"));
}

#[test]
fn test_compare_requires_two_scenarios() {
    let single = [LoanParameters::new(dec!(100_000), dec!(5), 360)];
    assert!(matches!(
        comparison::compare_loans(&single),
        Err(MortgageError::InsufficientScenarios { supplied: 1 })
    ));
}

#[test]
fn test_compare_loans_from_json() {
    let json = r#"[
        {"label": "bank", "principal": "320000", "annual_rate_percent": "6.25",
         "term_months": 360, "finance_fees": "3200", "origination_date": "2025-03-01"},
        {"label": "credit union", "principal": "320000", "annual_rate_percent": "6.125",
         "term_months": 360, "finance_fees": "6400", "origination_date": "2025-03-01"}
    ]"#;
    let loans: Vec<LoanParameters> = serde_json::from_str(json).unwrap();
    let output = comparison::compare_loans(&loans).unwrap();
    let cmp = &output.result;
    assert_eq!(cmp.scenarios.len(), 2);
    assert_eq!(cmp.best_label.as_deref(), Some("credit union"));
    assert!(output.warnings.is_empty());
    assert!(cmp.scenarios[0].apr_percent > dec!(6.25));
}
