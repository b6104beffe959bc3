use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub const SUPPORTED_UPLOAD_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `loanbook {cmd} --help` for usage."),
            None => "Run `loanbook --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn unsupported_file_type(filename: &str) -> Self {
        Self::new(
            "unsupported_file_type",
            &format!("Unsupported file type for `{filename}`. Allowed extensions: csv, xlsx."),
            vec![
                "Export the instrument book as .csv or .xlsx and retry.".to_string(),
                "Run `loanbook upload create --help` to review accepted formats.".to_string(),
            ],
        )
        .with_data(json!({
            "filename": filename,
            "supported_extensions": SUPPORTED_UPLOAD_EXTENSIONS,
        }))
    }

    pub fn empty_input(filename: &str) -> Self {
        Self::new(
            "empty_input",
            &format!("Upload file `{filename}` contains no data to process."),
            vec![
                "Check that the export produced a header row and instrument rows.".to_string(),
                "Rerun `loanbook upload create <path>` with a non-empty file.".to_string(),
            ],
        )
        .with_data(json!({
            "filename": filename,
        }))
    }

    pub fn source_unreadable(filename: &str, detail: &str) -> Self {
        Self::new(
            "source_unreadable",
            &format!("Could not parse upload file `{filename}`: {detail}"),
            vec![
                "Verify the file is a well-formed CSV or XLSX export.".to_string(),
                "Re-export the instrument book and retry.".to_string(),
            ],
        )
        .with_data(json!({
            "filename": filename,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `LOANBOOK_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid SQLite ledger file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
