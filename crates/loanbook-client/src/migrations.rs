use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

pub const REQUIRED_META_KEYS: [(&str, &str); 2] = [
    ("schema_version", "v1"),
    ("upload_contract_version", "v1"),
];

pub const REQUIRED_INDEX_NAMES: [&str; 4] = [
    "idx_internal_uploads_created_at_desc",
    "idx_internal_raw_rows_upload_id",
    "idx_internal_instruments_upload_id",
    "idx_internal_instruments_instrument_id",
];

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}
