pub(crate) mod coerce;
pub(crate) mod decode;
pub(crate) mod input;
pub(crate) mod persist;
pub(crate) mod validate;

pub mod classify;
pub mod explain;
pub mod stage;

use std::collections::BTreeMap;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::contracts::types::{RowPreview, UploadData};
use crate::setup::SetupContext;
use crate::state::open_connection;
use crate::upload::classify::classify_instrument;
use crate::upload::coerce::lenient_bool;
use crate::upload::explain::compose_trace;
use crate::upload::stage::{DpdInput, evaluate_staging};
use crate::upload::validate::{LedgerProbe, RowRecord, ValidatedInstrument};
use crate::ClientResult;

/// The derived IFRS 9 decision attached to a valid row. Enrichment reads the
/// row's optional columns leniently and can never invalidate the row.
#[derive(Debug, Clone)]
pub(crate) struct InstrumentDecision {
    pub(crate) stage: u8,
    pub(crate) category: classify::MeasurementCategory,
    pub(crate) trace: String,
}

#[derive(Debug, Clone)]
pub(crate) struct EnrichedInstrument {
    pub(crate) instrument: ValidatedInstrument,
    pub(crate) decision: InstrumentDecision,
}

/// One fully processed upload row on its way to persistence.
#[derive(Debug, Clone)]
pub(crate) struct UploadRow {
    pub(crate) row_number: i64,
    pub(crate) raw: BTreeMap<String, Option<String>>,
    pub(crate) errors: Vec<String>,
    pub(crate) validated: Option<EnrichedInstrument>,
}

pub(crate) fn execute(
    setup: &SetupContext,
    path: &str,
    dry_run: bool,
) -> ClientResult<UploadData> {
    let source = input::resolve_source(path)?;
    let checksum = sha256_hex(&source.bytes);
    info!(filename = %source.filename, dry_run, "processing instrument upload");

    let decoded = decode::decode_rows(source.kind, &source.bytes, &source.filename)?;
    debug!(rows = decoded.len(), "decoded upload rows");

    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;

    let records = {
        let probe = LedgerProbe::new(&connection, &db_path);
        validate::validate_rows(decoded, &probe)?
    };

    let rows: Vec<UploadRow> = records.into_iter().map(enrich_row).collect();

    let total_rows = rows.len() as i64;
    let valid_rows = rows.iter().filter(|row| row.errors.is_empty()).count() as i64;
    let invalid_rows = total_rows - valid_rows;

    let preview = rows
        .iter()
        .map(|row| RowPreview {
            row_number: row.row_number,
            raw_data: row.raw.clone(),
            errors: row.errors.clone(),
        })
        .collect::<Vec<RowPreview>>();

    if dry_run {
        info!(total_rows, valid_rows, invalid_rows, "dry run complete, nothing written");
        return Ok(UploadData {
            dry_run: true,
            upload_id: None,
            filename: source.filename,
            checksum,
            message: "Validation finished. No rows were written.".to_string(),
            total_rows,
            valid_rows,
            invalid_rows,
            preview,
        });
    }

    let persisted = persist::persist_upload(
        &mut connection,
        &db_path,
        persist::PersistInput {
            filename: &source.filename,
            checksum: &checksum,
            schema_version: &setup.schema_version,
            rows: &rows,
            total_rows,
            valid_rows,
            invalid_rows,
        },
    )?;
    info!(
        upload_id = %persisted.upload_id,
        raw = persisted.inserted_raw,
        instruments = persisted.inserted_instruments,
        "upload committed"
    );

    Ok(UploadData {
        dry_run: false,
        upload_id: Some(persisted.upload_id),
        filename: source.filename,
        checksum,
        message: "Upload completed successfully.".to_string(),
        total_rows,
        valid_rows,
        invalid_rows,
        preview,
    })
}

/// Derives the staging/classification decision for a valid row from its
/// optional enrichment columns. Invalid rows pass through untouched.
fn enrich_row(record: RowRecord) -> UploadRow {
    let validated = record.instrument.map(|instrument| {
        let decision = derive_decision(&record.raw, &instrument);
        EnrichedInstrument {
            instrument,
            decision,
        }
    });

    UploadRow {
        row_number: record.row_number,
        raw: record.raw,
        errors: record.errors,
        validated,
    }
}

fn derive_decision(
    raw: &BTreeMap<String, Option<String>>,
    instrument: &ValidatedInstrument,
) -> InstrumentDecision {
    let optional = |name: &str| raw.get(name).and_then(|value| value.as_deref());

    let default_flag = lenient_bool(optional("default_flag"));
    let days_past_due = DpdInput::from_raw(optional("days_past_due"));
    let sppi_passed = lenient_bool(optional("sppi_flag"));
    let business_model = optional("business_model").unwrap_or("");

    let staging = evaluate_staging(default_flag, days_past_due, instrument.sicr_flag);
    let classification = classify_instrument(sppi_passed, business_model);
    let trace = compose_trace(&staging, &classification);

    InstrumentDecision {
        stage: staging.stage,
        category: classification.category,
        trace,
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::sha256_hex;

    #[test]
    fn checksum_is_a_lowercase_sha256_hex_digest() {
        // Well-known digest of the empty input.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"loanbook").len(), 64);
    }
}
