use chrono::{NaiveDate, NaiveDateTime};

/// Field coercers collect failures into the caller's error list instead of
/// raising, so one row can report every problem in a single pass.

pub(crate) fn coerce_bool(
    value: Option<&str>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<bool> {
    let text = value.unwrap_or("").trim().to_ascii_lowercase();
    match text.as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => {
            errors.push(format!("Invalid boolean for {field}"));
            None
        }
    }
}

/// Parses a float and reports a range violation separately from a parse
/// failure: a value outside the bounds is still returned, because the
/// violation is data quality feedback rather than a coercion failure.
pub(crate) fn coerce_float(
    value: Option<&str>,
    field: &str,
    bounds: Option<(f64, f64)>,
    errors: &mut Vec<String>,
) -> Option<f64> {
    let parsed = value.unwrap_or("").trim().parse::<f64>();
    let Ok(number) = parsed else {
        errors.push(format!("Invalid float for {field}"));
        return None;
    };

    if !number.is_finite() {
        errors.push(format!("Invalid float for {field}"));
        return None;
    }

    if let Some((min, max)) = bounds
        && (number < min || number > max)
    {
        errors.push(format!("{field} out of bounds [{min},{max}]"));
    }

    Some(number)
}

pub(crate) fn coerce_date(
    value: Option<&str>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<NaiveDate> {
    let text = value.unwrap_or("").trim();

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    // Spreadsheet exports sometimes carry a time component on date cells.
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }

    errors.push(format!("Invalid date for {field}"));
    None
}

/// Best-effort boolean for enrichment inputs: anything outside the accepted
/// truthy set reads as false, and nothing is reported.
pub(crate) fn lenient_bool(value: Option<&str>) -> bool {
    matches!(
        value.unwrap_or("").trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
