use std::io;

use chrono::{Local, TimeZone};
use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_upload_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut lines = Vec::new();
    if dry_run {
        lines.push("Dry-run validation completed.".to_string());
    } else {
        lines.push("Upload completed successfully.".to_string());
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());

    let mut entries = Vec::new();
    if !dry_run {
        let upload_id = data
            .get("upload_id")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        entries.push(("Upload ID:", upload_id.to_string()));
    }
    entries.push((
        "File:",
        data.get("filename")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
    ));
    entries.push((
        "Checksum:",
        data.get("checksum")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
    ));
    entries.push(("Total rows:", get_i64(data, "total_rows").to_string()));
    entries.push(("Valid rows:", get_i64(data, "valid_rows").to_string()));
    entries.push(("Invalid rows:", get_i64(data, "invalid_rows").to_string()));
    lines.extend(format::key_value_rows(&entries, 2));

    let invalid_previews = invalid_rows(data);
    if !invalid_previews.is_empty() {
        lines.push(String::new());
        lines.push("Rows needing fixes:".to_string());
        for preview in &invalid_previews {
            let row_number = preview
                .get("row_number")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            lines.push(format!("  Row {row_number}:"));
            if let Some(errors) = preview.get("errors").and_then(Value::as_array) {
                for error in errors {
                    if let Some(text) = error.as_str() {
                        lines.push(format!("    - {text}"));
                    }
                }
            }
        }
    }

    if dry_run {
        lines.push(String::new());
        lines.push("No rows were written because this was a dry run.".to_string());
    }

    Ok(lines.join("\n"))
}

pub fn render_upload_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("upload list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No uploads found yet.",
            "",
            "Run your first upload:",
            "  1. loanbook upload create --help",
            "  2. loanbook upload create --dry-run <path>",
            "  3. loanbook upload create <path>",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 upload found.".to_string()
    } else {
        format!("{} uploads found.", rows.len())
    };

    let columns = [
        Column {
            name: "Upload ID",
            align: Align::Left,
        },
        Column {
            name: "File",
            align: Align::Left,
        },
        Column {
            name: "Created (local)",
            align: Align::Left,
        },
        Column {
            name: "Total",
            align: Align::Right,
        },
        Column {
            name: "Valid",
            align: Align::Right,
        },
        Column {
            name: "Invalid",
            align: Align::Right,
        },
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                row.get("upload_id")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                row.get("filename")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                format_created_local(row),
                get_i64(row, "total_rows").to_string(),
                get_i64(row, "valid_rows").to_string(),
                get_i64(row, "invalid_rows").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new(), "Uploads:".to_string()];
    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}

fn invalid_rows(data: &Value) -> Vec<Value> {
    data.get("preview")
        .and_then(Value::as_array)
        .map(|previews| {
            previews
                .iter()
                .filter(|preview| {
                    preview
                        .get("errors")
                        .and_then(Value::as_array)
                        .is_some_and(|errors| !errors.is_empty())
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn format_created_local(row: &Value) -> String {
    let raw = row
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(|text| text.parse::<i64>().ok());

    let Some(epoch_seconds) = raw else {
        return "unknown".to_string();
    };

    match Local.timestamp_opt(epoch_seconds, 0) {
        chrono::LocalResult::Single(datetime) => datetime.format("%Y-%m-%d %H:%M").to_string(),
        _ => "unknown".to_string(),
    }
}

fn get_i64(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}
