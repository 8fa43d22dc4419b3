//! CSV and JSON encoding of flattened rows.

use serde_json::Value;

use crate::error::ExportError;
use crate::flatten::Row;

const LINE_ENDING: &str = "\r\n";

/// Encode rows as CSV.
///
/// The header comes from the first row's columns. Each cell is written as
/// its JSON encoding, so strings are quoted and nested values appear as JSON
/// text. Null and missing cells are empty.
pub fn to_csv(rows: &[Row]) -> Result<String, ExportError> {
    let Some(first) = rows.first() else {
        return Err(ExportError::NoData);
    };
    let headers: Vec<&str> = first.columns().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in rows {
        let cells = headers
            .iter()
            .map(|h| encode_cell(row.get(h)))
            .collect::<Result<Vec<_>, _>>()?;
        lines.push(cells.join(","));
    }

    Ok(lines.join(LINE_ENDING))
}

/// Encode rows as a pretty-printed JSON array of objects.
pub fn to_json(rows: &[Row]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NoData);
    }
    let array = Value::Array(rows.iter().map(Row::to_object).collect());
    Ok(serde_json::to_string_pretty(&array)?)
}

fn encode_cell(value: Option<&Value>) -> Result<String, ExportError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(v) => Ok(serde_json::to_string(v)?),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cells_are_json_encoded_with_crlf() {
        let rows = vec![
            Row::new().with("date", json!("2024-01-15")).with("value", json!(28.1)),
            Row::new().with("date", json!("2024-02-15")).with("value", json!(28.4)),
        ];
        assert_eq!(
            to_csv(&rows).unwrap(),
            "date,value\r\n\"2024-01-15\",28.1\r\n\"2024-02-15\",28.4"
        );
    }

    #[test]
    fn null_missing_and_nested_cells() {
        let rows = vec![
            Row::new()
                .with("a", json!(null))
                .with("b", json!({"k": [1, 2]})),
            Row::new().with("b", json!(true)).with("extra", json!(1)),
        ];
        assert_eq!(to_csv(&rows).unwrap(), "a,b\r\n,{\"k\":[1,2]}\r\n,true");
    }

    #[test]
    fn empty_rows_are_rejected() {
        assert!(matches!(to_csv(&[]), Err(ExportError::NoData)));
        assert!(matches!(to_json(&[]), Err(ExportError::NoData)));
    }

    #[test]
    fn json_is_an_array_of_objects() {
        let rows = vec![Row::new().with("lat", json!(1.5)).with("id", json!("x"))];
        let parsed: Value = serde_json::from_str(&to_json(&rows).unwrap()).unwrap();
        assert_eq!(parsed, json!([{"lat": 1.5, "id": "x"}]));
    }
}
