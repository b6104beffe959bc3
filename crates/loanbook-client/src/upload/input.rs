use std::fs;
use std::path::Path;

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum FileKind {
    Csv,
    Xlsx,
}

#[derive(Debug)]
pub(crate) struct ResolvedSource {
    pub(crate) filename: String,
    pub(crate) kind: FileKind,
    pub(crate) bytes: Vec<u8>,
}

/// Resolves an upload path into bytes plus a decoder choice. The extension
/// gate runs before the file is read so unsupported uploads are rejected
/// without touching their content.
pub(crate) fn resolve_source(path: &str) -> ClientResult<ResolvedSource> {
    let filename = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let kind = file_kind(&filename).ok_or_else(|| ClientError::unsupported_file_type(&filename))?;

    let bytes = fs::read(path).map_err(|error| {
        ClientError::invalid_argument_with_recovery(
            &format!("Could not read upload file `{path}`: {error}"),
            vec![
                "Verify the path exists and is readable.".to_string(),
                "Rerun `loanbook upload create <path>`.".to_string(),
            ],
        )
    })?;

    if bytes.is_empty() {
        return Err(ClientError::empty_input(&filename));
    }

    Ok(ResolvedSource {
        filename,
        kind,
        bytes,
    })
}

fn file_kind(filename: &str) -> Option<FileKind> {
    let lowered = filename.to_ascii_lowercase();
    if lowered.ends_with(".csv") {
        return Some(FileKind::Csv);
    }
    if lowered.ends_with(".xlsx") {
        return Some(FileKind::Xlsx);
    }
    None
}
