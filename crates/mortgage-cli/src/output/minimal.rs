use serde_json::Value;

use super::scalar_text;

/// Key answer fields, most important first.
const PRIORITY_KEYS: [&str; 6] = [
    "monthly_payment",
    "apr_percent",
    "best_estimate_percent",
    "best_label",
    "best_index",
    "total_cost",
];

/// Print just the key answer value from the output.
///
/// Summaries print the monthly payment, APR runs the rate, comparisons the
/// winning scenario. A bare schedule prints its final row's balance.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key) {
                    if !val.is_null() {
                        println!("{}", scalar_text(val));
                        return;
                    }
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, scalar_text(val));
            }
        }
        Value::Array(rows) => match rows.last().and_then(|r| r.get("ending_balance")) {
            Some(balance) => println!("{}", scalar_text(balance)),
            None => println!("{} rows", rows.len()),
        },
        other => println!("{}", scalar_text(other)),
    }
}
