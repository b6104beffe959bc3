use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, TransactionBehavior, params};
use ulid::Ulid;

use crate::state::map_sqlite_error;
use crate::upload::UploadRow;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct PersistResult {
    pub(crate) upload_id: String,
    pub(crate) inserted_raw: i64,
    pub(crate) inserted_instruments: i64,
}

pub(crate) struct PersistInput<'a> {
    pub(crate) filename: &'a str,
    pub(crate) checksum: &'a str,
    pub(crate) schema_version: &'a str,
    pub(crate) rows: &'a [UploadRow],
    pub(crate) total_rows: i64,
    pub(crate) valid_rows: i64,
    pub(crate) invalid_rows: i64,
}

/// Writes the whole batch inside one IMMEDIATE transaction: the upload
/// record, every raw row (errors included), and a typed instrument row for
/// each error-free input row. Either all of it commits or none of it does.
pub(crate) fn persist_upload(
    connection: &mut Connection,
    db_path: &Path,
    input: PersistInput<'_>,
) -> ClientResult<PersistResult> {
    let upload_id = format!("upl_{}", Ulid::new());
    let timestamp = now_timestamp();

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| map_sqlite_error(db_path, &err))?;

    transaction
        .execute(
            "INSERT INTO internal_uploads (
                upload_id,
                filename,
                checksum,
                schema_version,
                created_at,
                total_rows,
                valid_rows,
                invalid_rows
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &upload_id,
                input.filename,
                input.checksum,
                input.schema_version,
                &timestamp,
                input.total_rows,
                input.valid_rows,
                input.invalid_rows
            ],
        )
        .map_err(|err| map_sqlite_error(db_path, &err))?;

    let mut inserted_raw = 0_i64;
    let mut inserted_instruments = 0_i64;
    for row in input.rows {
        insert_raw_row(&transaction, db_path, &upload_id, row)?;
        inserted_raw += 1;

        if row.validated.is_some() {
            insert_instrument_row(&transaction, db_path, &upload_id, row, &timestamp)?;
            inserted_instruments += 1;
        }
    }

    transaction
        .commit()
        .map_err(|err| map_sqlite_error(db_path, &err))?;

    Ok(PersistResult {
        upload_id,
        inserted_raw,
        inserted_instruments,
    })
}

fn insert_raw_row(
    transaction: &rusqlite::Transaction<'_>,
    db_path: &Path,
    upload_id: &str,
    row: &UploadRow,
) -> ClientResult<()> {
    let raw_id = format!("row_{}", Ulid::new());
    let raw_data = serde_json::to_string(&row.raw)
        .map_err(|err| ClientError::internal_serialization(&err.to_string()))?;
    let errors_json = if row.errors.is_empty() {
        None
    } else {
        Some(
            serde_json::to_string(&row.errors)
                .map_err(|err| ClientError::internal_serialization(&err.to_string()))?,
        )
    };

    transaction
        .execute(
            "INSERT INTO internal_raw_rows (
                raw_id,
                upload_id,
                row_number,
                raw_data,
                errors
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&raw_id, upload_id, row.row_number, &raw_data, &errors_json],
        )
        .map_err(|err| map_sqlite_error(db_path, &err))?;
    Ok(())
}

fn insert_instrument_row(
    transaction: &rusqlite::Transaction<'_>,
    db_path: &Path,
    upload_id: &str,
    row: &UploadRow,
    timestamp: &str,
) -> ClientResult<()> {
    let Some(enriched) = &row.validated else {
        return Err(ClientError::internal_serialization(
            "attempted to persist an instrument row without a typed projection",
        ));
    };
    let instrument = &enriched.instrument;
    let decision = &enriched.decision;

    let instrument_row_id = format!("ins_{}", Ulid::new());
    transaction
        .execute(
            "INSERT INTO internal_instruments (
                instrument_row_id,
                upload_id,
                instrument_id,
                borrower_id,
                asset_class,
                classification_category,
                measurement_basis,
                off_balance_flag,
                pd_12m,
                pd_lifetime,
                lgd,
                ead,
                sicr_flag,
                eir,
                collateral_flag,
                collateral_type,
                collateral_value,
                appraisal_date,
                drawdown_date,
                maturity_date,
                stage,
                measurement_category,
                decision_trace,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
            params![
                &instrument_row_id,
                upload_id,
                &instrument.instrument_id,
                &instrument.borrower_id,
                &instrument.asset_class,
                &instrument.classification_category,
                &instrument.measurement_basis,
                instrument.off_balance_flag,
                instrument.pd_12m,
                instrument.pd_lifetime,
                instrument.lgd,
                instrument.ead,
                instrument.sicr_flag,
                instrument.eir,
                instrument.collateral_flag,
                &instrument.collateral_type,
                instrument.collateral_value,
                instrument
                    .appraisal_date
                    .map(|date| date.format("%Y-%m-%d").to_string()),
                instrument.drawdown_date.format("%Y-%m-%d").to_string(),
                instrument.maturity_date.format("%Y-%m-%d").to_string(),
                i64::from(decision.stage),
                decision.category.as_str(),
                &decision.trace,
                timestamp
            ],
        )
        .map_err(|err| map_sqlite_error(db_path, &err))?;
    Ok(())
}

pub(crate) fn now_timestamp() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH);
    match now {
        Ok(duration) => format!("{}", duration.as_secs()),
        Err(_) => "0".to_string(),
    }
}
