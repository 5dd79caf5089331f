use crate::errors::DatasetError;
use crate::value_objects::comment_id::is_null_cell;
use crate::value_objects::raw_table::RawTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Calendar date of a cell; time-of-day and offsets are accepted and discarded.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if is_null_cell(trimmed) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Picks the column holding the observation date.
///
/// Order: `date` (only if at least one row parses), `date_x`, `date_y`, then
/// the first other header containing "date" (case-insensitive). A `date`
/// column that never parses is used only when nothing else qualifies.
pub fn resolve_date_column(table: &RawTable) -> Result<String, DatasetError> {
    let literal = table.column_index("date");
    if let Some(idx) = literal {
        let parses = table
            .iter()
            .any(|row| row.cell(idx).and_then(parse_date).is_some());
        if parses {
            return Ok("date".to_string());
        }
    }

    for candidate in ["date_x", "date_y"] {
        if table.column_index(candidate).is_some() {
            return Ok(candidate.to_string());
        }
    }

    let fuzzy = table
        .headers
        .iter()
        .find(|h| h.as_str() != "date" && h.to_lowercase().contains("date"));
    if let Some(header) = fuzzy {
        return Ok(header.clone());
    }

    if literal.is_some() {
        return Ok("date".to_string());
    }

    Err(DatasetError::schema(
        &table.name,
        "no usable date column (expected date, date_x, date_y or a column containing \"date\")",
        &table.headers,
    ))
}
