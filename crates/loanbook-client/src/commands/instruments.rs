use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::ToSql;

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{InstrumentListData, InstrumentRow};
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};
use crate::upload::coerce::lenient_bool;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct InstrumentListOptions<'a> {
    pub asset_class: Option<String>,
    pub classification_category: Option<String>,
    pub off_balance_flag: Option<bool>,
    pub errors: Option<bool>,
    pub home_override: Option<&'a Path>,
}

pub fn list(
    asset_class: Option<String>,
    classification_category: Option<String>,
    off_balance_flag: Option<bool>,
    errors: Option<bool>,
) -> ClientResult<SuccessEnvelope> {
    list_with_options(InstrumentListOptions {
        asset_class,
        classification_category,
        off_balance_flag,
        errors,
        home_override: None,
    })
}

/// Lists persisted raw instrument rows. Asset class and classification
/// category filter in SQL against the stored JSON payload; the boolean flag
/// and error-presence filters run on the decoded rows, matching how the
/// values were validated in the first place.
#[doc(hidden)]
pub fn list_with_options(options: InstrumentListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = match options.home_override {
        Some(home) => ensure_initialized_at(home)?,
        None => ensure_initialized()?,
    };
    let db_path = std::path::PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut sql = String::from(
        "SELECT raw_id, upload_id, row_number, raw_data, errors
         FROM internal_raw_rows",
    );
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(asset_class) = options.asset_class.as_ref() {
        clauses.push("json_extract(raw_data, '$.asset_class') = ?");
        params.push(asset_class);
    }
    if let Some(category) = options.classification_category.as_ref() {
        clauses.push("json_extract(raw_data, '$.classification_category') = ?");
        params.push(category);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY upload_id ASC, row_number ASC");

    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(&db_path, &error))?;
    let rows_iter = statement
        .query_map(params.as_slice(), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        let (raw_id, upload_id, row_number, raw_json, errors_json) =
            row.map_err(|error| map_sqlite_error(&db_path, &error))?;

        let raw_data: BTreeMap<String, Option<String>> = serde_json::from_str(&raw_json)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        let errors: Option<Vec<String>> = match errors_json {
            Some(text) => Some(
                serde_json::from_str(&text)
                    .map_err(|error| ClientError::internal_serialization(&error.to_string()))?,
            ),
            None => None,
        };

        if let Some(wanted_flag) = options.off_balance_flag {
            let actual = lenient_bool(
                raw_data
                    .get("off_balance_flag")
                    .and_then(|value| value.as_deref()),
            );
            if actual != wanted_flag {
                continue;
            }
        }

        if let Some(wants_errors) = options.errors {
            let has_errors = errors.as_ref().is_some_and(|list| !list.is_empty());
            if has_errors != wants_errors {
                continue;
            }
        }

        rows.push(InstrumentRow {
            raw_id,
            upload_id,
            row_number,
            raw_data,
            errors,
        });
    }

    success("instruments list", InstrumentListData { rows })
}
