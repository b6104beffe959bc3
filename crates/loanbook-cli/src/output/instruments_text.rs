use std::io;

use serde_json::Value;

/// Fields surfaced per row in text mode; the full raw payload stays behind
/// `--json`.
const SUMMARY_FIELDS: [&str; 4] = [
    "instrument_id",
    "asset_class",
    "classification_category",
    "off_balance_flag",
];

pub fn render_instruments_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("instruments list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No instrument rows matched.",
            "",
            "Widen the filters, or ingest a book first:",
            "  loanbook upload create <path>",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 instrument row found.".to_string()
    } else {
        format!("{} instrument rows found.", rows.len())
    };

    let mut lines = vec![count_label];
    for row in rows {
        lines.push(String::new());
        lines.push(format!(
            "  {} (upload {}, row {}):",
            row.get("raw_id").and_then(Value::as_str).unwrap_or("unknown"),
            row.get("upload_id")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
            row.get("row_number").and_then(Value::as_i64).unwrap_or(0),
        ));

        let raw_data = row.get("raw_data");
        for field in SUMMARY_FIELDS {
            let value = raw_data
                .and_then(|data| data.get(field))
                .and_then(Value::as_str)
                .unwrap_or("-");
            lines.push(format!("    {field}: {value}"));
        }

        match row.get("errors").and_then(Value::as_array) {
            Some(errors) if !errors.is_empty() => {
                lines.push("    errors:".to_string());
                for error in errors {
                    if let Some(text) = error.as_str() {
                        lines.push(format!("      - {text}"));
                    }
                }
            }
            _ => lines.push("    errors: none".to_string()),
        }
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_instruments_list;

    #[test]
    fn renders_row_blocks_with_errors() {
        let data = json!({
            "rows": [
                {
                    "raw_id": "row_1",
                    "upload_id": "upl_1",
                    "row_number": 3,
                    "raw_data": {"instrument_id": "L-001", "asset_class": "Corporate"},
                    "errors": ["Missing borrower_id"]
                }
            ]
        });

        let rendered = render_instruments_list(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("1 instrument row found."));
            assert!(text.contains("row_1 (upload upl_1, row 3):"));
            assert!(text.contains("instrument_id: L-001"));
            assert!(text.contains("- Missing borrower_id"));
        }
    }

    #[test]
    fn empty_result_suggests_widening_filters() {
        let rendered = render_instruments_list(&json!({"rows": []}));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("No instrument rows matched."));
        }
    }
}
