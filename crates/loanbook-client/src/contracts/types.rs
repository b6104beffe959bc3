use std::collections::BTreeMap;

use serde::Serialize;

/// One decoded input row as it travels through the upload response: the raw
/// field map exactly as decoded, plus every validation error collected for it.
#[derive(Debug, Clone, Serialize)]
pub struct RowPreview {
    pub row_number: i64,
    pub raw_data: BTreeMap<String, Option<String>>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadData {
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    pub filename: String,
    pub checksum: String,
    pub message: String,
    pub total_rows: i64,
    pub valid_rows: i64,
    pub invalid_rows: i64,
    pub preview: Vec<RowPreview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadListItem {
    pub upload_id: String,
    pub filename: String,
    pub checksum: String,
    pub schema_version: String,
    pub created_at: String,
    pub total_rows: i64,
    pub valid_rows: i64,
    pub invalid_rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadListData {
    pub rows: Vec<UploadListItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentRow {
    pub raw_id: String,
    pub upload_id: String,
    pub row_number: i64,
    pub raw_data: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstrumentListData {
    pub rows: Vec<InstrumentRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionData {
    pub stage: u8,
    pub staging_reasons: Vec<String>,
    pub category: String,
    pub classification_reasons: Vec<String>,
    pub trace: String,
}
