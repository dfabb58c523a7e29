//! CSV rendering - pure functions from records to text
//!
//! Values containing a comma are wrapped in double quotes. Embedded quotes
//! are left as they are, so a value holding both `"` and `,` does not
//! survive a strict CSV parser.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::API_DATE_FORMAT;
use crate::error::ExportError;

/// A row as field name to value, in insertion order
pub type Record = Map<String, Value>;

/// `{base}-{YYYY-MM-DD}.csv`
pub fn export_filename(base: &str, today: NaiveDate) -> String {
    format!("{}-{}.csv", base, today.format(API_DATE_FORMAT))
}

/// Header row, then one line per row with a cell per header.
///
/// A cell is read under the exact header, then under the lowercased
/// header, then left empty. Returns `None` for no rows.
pub fn render_rows<T: Serialize>(
    rows: &[T],
    headers: &[&str],
) -> Result<Option<String>, ExportError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        let record = to_record(row)?;
        lines.push(
            headers
                .iter()
                .map(|header| lookup(&record, header, true))
                .collect(),
        );
    }

    Ok(Some(write_csv(headers, &lines)))
}

/// Map every row first; headers are the keys of the first mapped row in
/// the order they were inserted. Lookups are exact only.
pub fn render_mapped<T, F>(rows: &[T], mapper: F) -> Result<Option<String>, ExportError>
where
    F: Fn(&T) -> Record,
{
    let mapped: Vec<Record> = rows.iter().map(mapper).collect();
    let Some(first) = mapped.first() else {
        return Ok(None);
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let lines: Vec<Vec<String>> = mapped
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|header| lookup(record, header, false))
                .collect()
        })
        .collect();

    Ok(Some(write_csv(&headers, &lines)))
}

fn to_record<T: Serialize>(row: &T) -> Result<Record, ExportError> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Record::new()),
    }
}

fn lookup(record: &Record, header: &str, lowercase_fallback: bool) -> String {
    let present = |key: &str| record.get(key).filter(|v| !v.is_null());

    let value = match present(header) {
        Some(value) => Some(value),
        None if lowercase_fallback => present(&header.to_lowercase()),
        None => None,
    };

    value.map(cell).unwrap_or_default()
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    if text.contains(',') {
        format!("\"{}\"", text)
    } else {
        text
    }
}

/// Join with `,` and `\n`, no trailing newline
fn write_csv<H: AsRef<str>>(headers: &[H], lines: &[Vec<String>]) -> String {
    let header = headers
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<_>>()
        .join(",");

    std::iter::once(header)
        .chain(lines.iter().map(|cells| cells.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_comma_values_are_quoted() {
        let rows = vec![json!({"a": "1,2", "b": "x"})];
        let body = render_rows(&rows, &["a", "b"]).unwrap().unwrap();
        assert_eq!(body, "a,b\n\"1,2\",x");
    }

    #[test]
    fn test_lowercase_fallback_then_empty() {
        let rows = vec![
            json!({"name": "Acme", "Email": "sales@acme.test"}),
            json!({"Name": "Globex"}),
        ];
        let body = render_rows(&rows, &["Name", "Email", "Phone"]).unwrap().unwrap();
        assert_eq!(body, "Name,Email,Phone\nAcme,sales@acme.test,\nGlobex,,");
    }

    #[test]
    fn test_single_empty_cell_is_an_empty_line() {
        let rows = vec![json!({"b": "x"}), json!({"a": "y"})];
        let body = render_rows(&rows, &["a"]).unwrap().unwrap();
        assert_eq!(body, "a\n\ny");

        let only = vec![json!({"b": "x"})];
        assert_eq!(render_rows(&only, &["a"]).unwrap().unwrap(), "a\n");
    }

    #[test]
    fn test_exact_key_wins_over_lowercase() {
        let rows = vec![json!({"Name": "Upper", "name": "lower"})];
        let body = render_rows(&rows, &["Name"]).unwrap().unwrap();
        assert_eq!(body, "Name\nUpper");
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        let rows = vec![json!({"note": "said \"hi\", left"})];
        let body = render_rows(&rows, &["note"]).unwrap().unwrap();
        assert_eq!(body, "note\n\"said \"hi\", left\"");
    }

    #[test]
    fn test_non_string_values() {
        let rows = vec![json!({"qty": 12, "active": true, "price": 2.5, "sku": null})];
        let body = render_rows(&rows, &["qty", "active", "price", "sku"])
            .unwrap()
            .unwrap();
        assert_eq!(body, "qty,active,price,sku\n12,true,2.5,");
    }

    #[test]
    fn test_typed_rows_serialize() {
        #[derive(Serialize)]
        struct Line {
            name: String,
            quantity: u32,
        }
        let rows = vec![Line {
            name: "Bolts, M6".into(),
            quantity: 400,
        }];
        let body = render_rows(&rows, &["Name", "Quantity"]).unwrap().unwrap();
        assert_eq!(body, "Name,Quantity\n\"Bolts, M6\",400");
    }

    #[test]
    fn test_mapped_uses_first_row_key_order() {
        let rows = vec![("Acme", 3), ("Globex", 1)];
        let body = render_mapped(&rows, |(name, count)| {
            record(json!({"Supplier": name, "Orders": count}))
        })
        .unwrap()
        .unwrap();
        assert_eq!(body, "Supplier,Orders\nAcme,3\nGlobex,1");
    }

    #[test]
    fn test_mapped_has_no_lowercase_fallback() {
        let rows = vec![0, 1];
        let body = render_mapped(&rows, |i| {
            if *i == 0 {
                record(json!({"Name": "first", "Qty": 1}))
            } else {
                record(json!({"name": "second", "Qty": 2}))
            }
        })
        .unwrap()
        .unwrap();
        assert_eq!(body, "Name,Qty\nfirst,1\n,2");
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        let rows: Vec<Value> = Vec::new();
        assert!(render_rows(&rows, &["a"]).unwrap().is_none());
        assert!(render_mapped(&rows, |_| Record::new()).unwrap().is_none());
    }

    #[test]
    fn test_filename_has_date() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(export_filename("suppliers", day), "suppliers-2024-05-15.csv");
    }
}
