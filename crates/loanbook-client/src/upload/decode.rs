use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::upload::input::FileKind;
use crate::{ClientError, ClientResult};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// One decoded input row. `fields` is keyed by the normalized (trimmed,
/// lower-cased) column header; a missing cell is `None`, a present-but-empty
/// cell is `Some("")`. Row numbers are 1-indexed from the first data row.
#[derive(Debug, Clone)]
pub(crate) struct RawRow {
    pub(crate) row_number: i64,
    pub(crate) fields: BTreeMap<String, Option<String>>,
}

pub(crate) fn decode_rows(
    kind: FileKind,
    bytes: &[u8],
    filename: &str,
) -> ClientResult<Vec<RawRow>> {
    match kind {
        FileKind::Csv => decode_csv(bytes, filename),
        FileKind::Xlsx => decode_xlsx(bytes, filename),
    }
}

fn decode_csv(bytes: &[u8], filename: &str) -> ClientResult<Vec<RawRow>> {
    let without_bom = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(without_bom)
        .map_err(|_| ClientError::source_unreadable(filename, "content is not valid UTF-8"))?;

    if text.trim().is_empty() {
        return Err(ClientError::empty_input(filename));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| ClientError::source_unreadable(filename, "header row is unreadable"))?
        .iter()
        .map(normalize_header)
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    for (row_index, record_result) in reader.records().enumerate() {
        let record = record_result
            .map_err(|_| ClientError::source_unreadable(filename, "row data is malformed"))?;

        let mut fields = BTreeMap::new();
        for (column_index, header) in headers.iter().enumerate() {
            let value = record.get(column_index).map(str::to_string);
            fields.insert(header.clone(), value);
        }

        rows.push(RawRow {
            row_number: (row_index as i64) + 1,
            fields,
        });
    }

    Ok(rows)
}

fn decode_xlsx(bytes: &[u8], filename: &str) -> ClientResult<Vec<RawRow>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = Xlsx::new(cursor)
        .map_err(|error| ClientError::source_unreadable(filename, &error.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(error)) => {
            return Err(ClientError::source_unreadable(filename, &error.to_string()));
        }
        None => return Err(ClientError::empty_input(filename)),
    };

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        // A workbook with no header row at all cannot describe any columns.
        return Err(ClientError::empty_input(filename));
    };

    let headers = header_row
        .iter()
        .map(|cell| normalize_header(&cell_to_value(cell).unwrap_or_default()))
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    for (row_index, sheet_row) in sheet_rows.enumerate() {
        let mut fields = BTreeMap::new();
        for (column_index, header) in headers.iter().enumerate() {
            let value = sheet_row.get(column_index).and_then(cell_to_value);
            fields.insert(header.clone(), value);
        }

        rows.push(RawRow {
            row_number: (row_index as i64) + 1,
            fields,
        });
    }

    Ok(rows)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Renders a spreadsheet cell the way it would appear in a CSV export so the
/// coercers see one input shape. Integral floats lose their trailing `.0`;
/// date cells render as ISO dates (with a time suffix only when non-midnight).
fn cell_to_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(text.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(render_float(*value)),
        Data::Bool(value) => Some(if *value { "true" } else { "false" }.to_string()),
        Data::DateTime(excel_datetime) => Some(render_datetime(excel_datetime)),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Some(text.clone()),
        Data::Error(_) => None,
    }
}

fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}

fn render_datetime(excel_datetime: &calamine::ExcelDateTime) -> String {
    if let Some(datetime) = excel_datetime.as_datetime() {
        if datetime.time() == chrono::NaiveTime::MIN {
            return datetime.date().format("%Y-%m-%d").to_string();
        }
        return datetime.format("%Y-%m-%dT%H:%M:%S").to_string();
    }
    excel_datetime.as_f64().to_string()
}

#[cfg(test)]
mod tests {
    use calamine::Data;

    use super::{FileKind, cell_to_value, decode_rows, normalize_header, render_float};

    fn field<'a>(
        row: &'a super::RawRow,
        name: &str,
    ) -> Option<&'a str> {
        row.fields.get(name).and_then(|value| value.as_deref())
    }

    #[test]
    fn csv_headers_are_trimmed_and_lowercased() {
        let csv = " Instrument_ID , Borrower_ID\nL1,B1\n";
        let rows = decode_rows(FileKind::Csv, csv.as_bytes(), "book.csv");
        assert!(rows.is_ok());
        if let Ok(rows) = rows {
            assert_eq!(rows.len(), 1);
            assert_eq!(field(&rows[0], "instrument_id"), Some("L1"));
            assert_eq!(field(&rows[0], "borrower_id"), Some("B1"));
        }
    }

    #[test]
    fn csv_byte_order_mark_is_stripped() {
        let csv = "\u{feff}instrument_id,borrower_id\nL1,B1\n";
        let rows = decode_rows(FileKind::Csv, csv.as_bytes(), "book.csv");
        assert!(rows.is_ok());
        if let Ok(rows) = rows {
            assert_eq!(field(&rows[0], "instrument_id"), Some("L1"));
        }
    }

    #[test]
    fn csv_short_rows_pad_missing_cells_with_none() {
        let csv = "instrument_id,borrower_id,asset_class\nL1,B1\n";
        let rows = decode_rows(FileKind::Csv, csv.as_bytes(), "book.csv");
        assert!(rows.is_ok());
        if let Ok(rows) = rows {
            assert_eq!(rows[0].fields.get("asset_class"), Some(&None));
        }
    }

    #[test]
    fn csv_blank_lines_are_skipped_and_numbering_is_preserved() {
        let csv = "instrument_id\nL1\n\nL2\n";
        let rows = decode_rows(FileKind::Csv, csv.as_bytes(), "book.csv");
        assert!(rows.is_ok());
        if let Ok(rows) = rows {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].row_number, 1);
            assert_eq!(rows[1].row_number, 2);
            assert_eq!(field(&rows[1], "instrument_id"), Some("L2"));
        }
    }

    #[test]
    fn csv_header_only_yields_empty_batch() {
        let csv = "instrument_id,borrower_id\n";
        let rows = decode_rows(FileKind::Csv, csv.as_bytes(), "book.csv");
        assert!(rows.is_ok());
        if let Ok(rows) = rows {
            assert!(rows.is_empty());
        }
    }

    #[test]
    fn empty_csv_is_a_structural_error() {
        let result = decode_rows(FileKind::Csv, b"  \n ", "book.csv");
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "empty_input");
        }
    }

    #[test]
    fn non_utf8_csv_is_a_structural_error() {
        let result = decode_rows(FileKind::Csv, &[0xff, 0xfe, 0x00], "book.csv");
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "source_unreadable");
        }
    }

    #[test]
    fn garbage_xlsx_bytes_are_a_structural_error() {
        let result = decode_rows(FileKind::Xlsx, b"not a zip archive", "book.xlsx");
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "source_unreadable");
        }
    }

    #[test]
    fn cell_rendering_matches_csv_conventions() {
        assert_eq!(cell_to_value(&Data::Empty), None);
        assert_eq!(
            cell_to_value(&Data::String("Corporate".to_string())),
            Some("Corporate".to_string())
        );
        assert_eq!(cell_to_value(&Data::Int(45)), Some("45".to_string()));
        assert_eq!(cell_to_value(&Data::Float(0.25)), Some("0.25".to_string()));
        assert_eq!(cell_to_value(&Data::Float(100.0)), Some("100".to_string()));
        assert_eq!(cell_to_value(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn integral_floats_drop_the_decimal_suffix() {
        assert_eq!(render_float(3.0), "3");
        assert_eq!(render_float(0.5), "0.5");
        assert_eq!(render_float(-12.0), "-12");
    }

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header("  PD_12M  "), "pd_12m");
        assert_eq!(normalize_header("sicr_flag"), "sicr_flag");
    }
}
