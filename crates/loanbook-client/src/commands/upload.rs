use std::path::Path;

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{UploadListData, UploadListItem};
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};
use crate::upload;
use crate::ClientResult;

#[derive(Debug, Default)]
pub struct UploadRunOptions<'a> {
    pub path: String,
    pub dry_run: bool,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct UploadListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn run(path: String, dry_run: bool) -> ClientResult<SuccessEnvelope> {
    run_with_options(UploadRunOptions {
        path,
        dry_run,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: UploadRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let data = upload::execute(&setup, &options.path, options.dry_run)?;
    success("upload", data)
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(UploadListOptions {
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: UploadListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = std::path::PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut statement = connection
        .prepare(
            "SELECT
                upload_id,
                filename,
                checksum,
                schema_version,
                created_at,
                total_rows,
                valid_rows,
                invalid_rows
             FROM internal_uploads
             ORDER BY CAST(created_at AS INTEGER) DESC, upload_id DESC",
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;
    let rows_iter = statement
        .query_map([], |row| {
            Ok(UploadListItem {
                upload_id: row.get(0)?,
                filename: row.get(1)?,
                checksum: row.get(2)?,
                schema_version: row.get(3)?,
                created_at: row.get(4)?,
                total_rows: row.get(5)?,
                valid_rows: row.get(6)?,
                invalid_rows: row.get(7)?,
            })
        })
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        let item = row.map_err(|error| map_sqlite_error(&db_path, &error))?;
        rows.push(item);
    }

    success("upload list", UploadListData { rows })
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    match home_override {
        Some(home) => ensure_initialized_at(home),
        None => ensure_initialized(),
    }
}
