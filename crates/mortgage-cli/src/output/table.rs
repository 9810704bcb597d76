use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{scalar_text, NESTED_TABLES};

/// Format output as tables: scalar fields as a Field/Value table, and each
/// schedule, annual breakdown or scenario list as its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result(result, map),
            None => print_object(map),
        },
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", scalar_text(other)),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => print_object(res_map),
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", scalar_text(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if NESTED_TABLES.contains(&key.as_str()) {
            continue;
        }
        builder.push_record([key.as_str(), &cell_text(val)]);
    }
    println!("{}", Table::from(builder));

    for key in NESTED_TABLES {
        if let Some(Value::Array(rows)) = map.get(key) {
            println!("\n{}:", key.replace('_', " "));
            print_rows(rows);
        }
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            println!("(empty)");
        }
        for item in rows {
            println!("{}", scalar_text(item));
        }
        return;
    };

    // Nested summaries inside comparison rows are too wide for a table.
    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .map(|(k, _)| k.clone())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell_text).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, scalar_text(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}
