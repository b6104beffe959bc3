use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use crate::ClientResult;
use crate::commands::common::{COLLATERAL_DETAIL_FIELDS, REQUIRED_UPLOAD_FIELDS};
use crate::state::map_sqlite_error;
use crate::upload::coerce::{coerce_bool, coerce_date, coerce_float};
use crate::upload::decode::RawRow;

/// Typed projection of an upload row; constructed only when the row's error
/// list is empty. There is no partial promotion: a row either coerces fully
/// or stays raw with its errors.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedInstrument {
    pub(crate) instrument_id: String,
    pub(crate) borrower_id: String,
    pub(crate) asset_class: String,
    pub(crate) classification_category: String,
    pub(crate) measurement_basis: String,
    pub(crate) off_balance_flag: bool,
    pub(crate) pd_12m: f64,
    pub(crate) pd_lifetime: f64,
    pub(crate) lgd: f64,
    pub(crate) ead: f64,
    pub(crate) sicr_flag: bool,
    pub(crate) eir: f64,
    pub(crate) collateral_flag: bool,
    pub(crate) collateral_type: Option<String>,
    pub(crate) collateral_value: Option<f64>,
    pub(crate) appraisal_date: Option<NaiveDate>,
    pub(crate) drawdown_date: NaiveDate,
    pub(crate) maturity_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub(crate) struct RowRecord {
    pub(crate) row_number: i64,
    pub(crate) raw: BTreeMap<String, Option<String>>,
    pub(crate) errors: Vec<String>,
    pub(crate) instrument: Option<ValidatedInstrument>,
}

/// Answers "was this identifier persisted by an earlier upload". The batch
/// half of duplicate detection lives in `SeenInstruments` so both sources are
/// consulted from one call site, in one order.
pub(crate) trait DuplicateProbe {
    fn already_persisted(&self, instrument_id: &str) -> ClientResult<bool>;
}

pub(crate) struct LedgerProbe<'a> {
    connection: &'a Connection,
    db_path: &'a Path,
}

impl<'a> LedgerProbe<'a> {
    pub(crate) fn new(connection: &'a Connection, db_path: &'a Path) -> Self {
        Self {
            connection,
            db_path,
        }
    }
}

impl DuplicateProbe for LedgerProbe<'_> {
    fn already_persisted(&self, instrument_id: &str) -> ClientResult<bool> {
        let found = self
            .connection
            .query_row(
                "SELECT 1 FROM internal_instruments WHERE instrument_id = ?1 LIMIT 1",
                [instrument_id],
                |_row| Ok(true),
            )
            .optional()
            .map_err(|error| map_sqlite_error(self.db_path, &error))?;
        Ok(found.unwrap_or(false))
    }
}

struct SeenInstruments<'p> {
    batch: HashSet<String>,
    probe: &'p dyn DuplicateProbe,
}

impl<'p> SeenInstruments<'p> {
    fn new(probe: &'p dyn DuplicateProbe) -> Self {
        Self {
            batch: HashSet::new(),
            probe,
        }
    }

    /// Registers one identifier sighting and appends duplicate errors.
    /// The first batch occurrence is never flagged against itself; the
    /// ledger check runs on every sighting.
    fn observe(&mut self, instrument_id: &str, errors: &mut Vec<String>) -> ClientResult<()> {
        if !self.batch.insert(instrument_id.to_string()) {
            errors.push("Duplicate instrument_id".to_string());
        }
        if self.probe.already_persisted(instrument_id)? {
            errors.push("instrument_id already exists".to_string());
        }
        Ok(())
    }
}

pub(crate) fn validate_rows(
    rows: Vec<RawRow>,
    probe: &dyn DuplicateProbe,
) -> ClientResult<Vec<RowRecord>> {
    let mut seen = SeenInstruments::new(probe);
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(validate_row(row, &mut seen)?);
    }
    Ok(records)
}

fn validate_row(row: RawRow, seen: &mut SeenInstruments<'_>) -> ClientResult<RowRecord> {
    let raw = row.fields;
    let mut errors = Vec::new();

    for (field, _) in REQUIRED_UPLOAD_FIELDS {
        if field_value(&raw, field).is_none() {
            errors.push(format!("Missing {field}"));
        }
    }

    let off_balance_flag = coerce_bool(
        field_value(&raw, "off_balance_flag"),
        "off_balance_flag",
        &mut errors,
    );
    let pd_12m = coerce_float(
        field_value(&raw, "pd_12m"),
        "pd_12m",
        Some((0.0, 1.0)),
        &mut errors,
    );
    let pd_lifetime = coerce_float(
        field_value(&raw, "pd_lifetime"),
        "pd_lifetime",
        Some((0.0, 1.0)),
        &mut errors,
    );
    let lgd = coerce_float(field_value(&raw, "lgd"), "lgd", None, &mut errors);
    let ead = coerce_float(field_value(&raw, "ead"), "ead", None, &mut errors);
    let sicr_flag = coerce_bool(field_value(&raw, "sicr_flag"), "sicr_flag", &mut errors);
    let eir = coerce_float(field_value(&raw, "eir"), "eir", None, &mut errors);
    let collateral_flag = coerce_bool(
        field_value(&raw, "collateral_flag"),
        "collateral_flag",
        &mut errors,
    );
    let drawdown_date = coerce_date(
        field_value(&raw, "drawdown_date"),
        "drawdown_date",
        &mut errors,
    );
    let maturity_date = coerce_date(
        field_value(&raw, "maturity_date"),
        "maturity_date",
        &mut errors,
    );

    if collateral_flag == Some(true) {
        for field in COLLATERAL_DETAIL_FIELDS {
            if field_value(&raw, field).is_none() {
                errors.push(format!("Missing {field} for collateral_flag"));
            }
        }
    }

    // Collateral details coerce whenever present, so a garbled value is
    // reported instead of silently dropped from the typed projection.
    let collateral_type = field_value(&raw, "collateral_type").map(str::to_string);
    let collateral_value = field_value(&raw, "collateral_value")
        .and_then(|value| coerce_float(Some(value), "collateral_value", None, &mut errors));
    let appraisal_date = field_value(&raw, "appraisal_date")
        .and_then(|value| coerce_date(Some(value), "appraisal_date", &mut errors));

    if let (Some(drawdown), Some(maturity)) = (drawdown_date, maturity_date)
        && maturity <= drawdown
    {
        errors.push("maturity_date must be after drawdown_date".to_string());
    }

    if let Some(instrument_id) = field_value(&raw, "instrument_id") {
        seen.observe(instrument_id, &mut errors)?;
    }

    let instrument = if errors.is_empty() {
        build_instrument(
            &raw,
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
        )
    } else {
        None
    };

    Ok(RowRecord {
        row_number: row.row_number,
        raw,
        errors,
        instrument,
    })
}

/// Returns the field's value when it is present and non-blank.
fn field_value<'a>(raw: &'a BTreeMap<String, Option<String>>, field: &str) -> Option<&'a str> {
    let value = raw.get(field)?.as_deref()?;
    if value.trim().is_empty() {
        return None;
    }
    Some(value)
}

#[allow(clippy::too_many_arguments)]
fn build_instrument(
    raw: &BTreeMap<String, Option<String>>,
    off_balance_flag: Option<bool>,
    pd_12m: Option<f64>,
    pd_lifetime: Option<f64>,
    lgd: Option<f64>,
    ead: Option<f64>,
    sicr_flag: Option<bool>,
    eir: Option<f64>,
    collateral_flag: Option<bool>,
    collateral_type: Option<String>,
    collateral_value: Option<f64>,
    appraisal_date: Option<NaiveDate>,
    drawdown_date: Option<NaiveDate>,
    maturity_date: Option<NaiveDate>,
) -> Option<ValidatedInstrument> {
    Some(ValidatedInstrument {
        instrument_id: field_value(raw, "instrument_id")?.to_string(),
        borrower_id: field_value(raw, "borrower_id")?.to_string(),
        asset_class: field_value(raw, "asset_class")?.to_string(),
        classification_category: field_value(raw, "classification_category")?.to_string(),
        measurement_basis: field_value(raw, "measurement_basis")?.to_string(),
        off_balance_flag: off_balance_flag?,
        pd_12m: pd_12m?,
        pd_lifetime: pd_lifetime?,
        lgd: lgd?,
        ead: ead?,
        sicr_flag: sicr_flag?,
        eir: eir?,
        collateral_flag: collateral_flag?,
        collateral_type,
        collateral_value,
        appraisal_date,
        drawdown_date: drawdown_date?,
        maturity_date: maturity_date?,
    })
}
