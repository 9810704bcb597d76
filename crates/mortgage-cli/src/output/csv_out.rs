use serde_json::Value;
use std::io;

use super::{scalar_text, NESTED_TABLES};

/// Write output as CSV to stdout.
///
/// Schedules and breakdowns become one row per period or year. A result
/// object carrying a schedule is written as that schedule; otherwise its
/// scalar fields become a two-column field/value sheet.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(rows) => write_rows(&mut wtr, rows),
        Value::Object(map) => {
            let nested = NESTED_TABLES
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array));
            match nested {
                Some(rows) => write_rows(&mut wtr, rows),
                None => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in map {
                        let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
                    }
                }
            }
        }
        other => {
            let _ = wtr.write_record([&scalar_text(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            let _ = wtr.write_record([&scalar_text(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .map(|(k, _)| k.as_str())
        .collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(scalar_text).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
