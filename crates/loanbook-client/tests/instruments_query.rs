use std::fs;
use std::path::{Path, PathBuf};

use loanbook_client::commands::instruments;
use loanbook_client::commands::instruments::InstrumentListOptions;
use loanbook_client::commands::upload;
use loanbook_client::commands::upload::UploadRunOptions;
use serde_json::Value;
use tempfile::tempdir;

const HEADER: &str = "instrument_id,borrower_id,asset_class,classification_category,\
measurement_basis,off_balance_flag,pd_12m,pd_lifetime,lgd,ead,sicr_flag,eir,\
collateral_flag,drawdown_date,maturity_date";

fn row(instrument_id: &str, asset_class: &str, category: &str, off_balance: &str) -> String {
    format!(
        "{instrument_id},B-001,{asset_class},{category},Amortized Cost,{off_balance},0.02,0.10,\
         0.45,250000,false,0.055,false,2023-01-15,2028-01-15"
    )
}

fn temp_home() -> std::io::Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempdir()?;
    let home = dir.path().join("ledger-home");
    Ok((dir, home))
}

fn seed_mixed_book(temp: &tempfile::TempDir, home: &Path) {
    let book = temp.path().join("book.csv");
    // Four rows: two Corporate / two Retail, one off-balance, one broken.
    let broken = row("L-004", "Retail", "Loans", "false").replace("0.02", "bad");
    let body = format!(
        "{HEADER}\n{}\n{}\n{}\n{broken}\n",
        row("L-001", "Corporate", "Loans", "false"),
        row("L-002", "Corporate", "Bonds", "true"),
        row("L-003", "Retail", "Loans", "false"),
    );
    let written = fs::write(&book, body);
    assert!(written.is_ok());

    let uploaded = upload::run_with_options(UploadRunOptions {
        path: book.display().to_string(),
        dry_run: false,
        home_override: Some(home),
    });
    assert!(uploaded.is_ok());
}

fn list(
    home: &Path,
    asset_class: Option<&str>,
    category: Option<&str>,
    off_balance_flag: Option<bool>,
    errors: Option<bool>,
) -> Vec<Value> {
    let result = instruments::list_with_options(InstrumentListOptions {
        asset_class: asset_class.map(str::to_string),
        classification_category: category.map(str::to_string),
        off_balance_flag,
        errors,
        home_override: Some(home),
    });
    assert!(result.is_ok());
    let Ok(envelope) = result else {
        return Vec::new();
    };
    envelope.data["rows"].as_array().cloned().unwrap_or_default()
}

fn instrument_ids(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| {
            row["raw_data"]["instrument_id"]
                .as_str()
                .map(str::to_string)
        })
        .collect()
}

#[test]
fn unfiltered_list_returns_every_persisted_row() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp, home)) = temp {
        seed_mixed_book(&temp, &home);

        let rows = list(&home, None, None, None, None);
        assert_eq!(rows.len(), 4);
        assert_eq!(
            instrument_ids(&rows),
            vec!["L-001", "L-002", "L-003", "L-004"]
        );
    }
}

#[test]
fn asset_class_filter_is_exact() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp, home)) = temp {
        seed_mixed_book(&temp, &home);

        let corporate = list(&home, Some("Corporate"), None, None, None);
        assert_eq!(instrument_ids(&corporate), vec!["L-001", "L-002"]);

        let lowercased = list(&home, Some("corporate"), None, None, None);
        assert!(lowercased.is_empty());
    }
}

#[test]
fn classification_category_filter_composes_with_asset_class() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp, home)) = temp {
        seed_mixed_book(&temp, &home);

        let rows = list(&home, Some("Corporate"), Some("Loans"), None, None);
        assert_eq!(instrument_ids(&rows), vec!["L-001"]);
    }
}

#[test]
fn off_balance_filter_matches_the_coerced_flag() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp, home)) = temp {
        seed_mixed_book(&temp, &home);

        let off_balance = list(&home, None, None, Some(true), None);
        assert_eq!(instrument_ids(&off_balance), vec!["L-002"]);

        let on_balance = list(&home, None, None, Some(false), None);
        assert_eq!(instrument_ids(&on_balance), vec!["L-001", "L-003", "L-004"]);
    }
}

#[test]
fn errors_filter_splits_clean_and_failed_rows() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp, home)) = temp {
        seed_mixed_book(&temp, &home);

        let failed = list(&home, None, None, None, Some(true));
        assert_eq!(instrument_ids(&failed), vec!["L-004"]);
        assert!(failed[0]["errors"].as_array().is_some_and(|e| !e.is_empty()));

        let clean = list(&home, None, None, None, Some(false));
        assert_eq!(instrument_ids(&clean), vec!["L-001", "L-002", "L-003"]);
    }
}
