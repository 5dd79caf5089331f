use crate::errors::DatasetError;
use crate::value_objects::raw_table::RawTable;
use std::collections::{HashMap, HashSet};

/// Left join of two raw tables on `key`. Overlapping non-key columns get the
/// `_x` (left) and `_y` (right) suffixes; the first right row per key wins.
pub fn merge_left(left: &RawTable, right: &RawTable, key: &str) -> Result<RawTable, DatasetError> {
    let left_key = left.column_index(key).ok_or_else(|| {
        DatasetError::schema(&left.name, format!("merge key `{key}` missing"), &left.headers)
    })?;
    let right_key = right.column_index(key).ok_or_else(|| {
        DatasetError::schema(&right.name, format!("merge key `{key}` missing"), &right.headers)
    })?;

    let left_names: HashSet<&str> = left
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != left_key)
        .map(|(_, h)| h.as_str())
        .collect();
    let overlapping: HashSet<&str> = right
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, h)| *idx != right_key && left_names.contains(h.as_str()))
        .map(|(_, h)| h.as_str())
        .collect();

    let mut headers = Vec::with_capacity(left.headers.len() + right.headers.len() - 1);
    for (idx, header) in left.headers.iter().enumerate() {
        if idx != left_key && overlapping.contains(header.as_str()) {
            headers.push(format!("{header}_x"));
        } else {
            headers.push(header.clone());
        }
    }
    for (idx, header) in right.headers.iter().enumerate() {
        if idx == right_key {
            continue;
        }
        if overlapping.contains(header.as_str()) {
            headers.push(format!("{header}_y"));
        } else {
            headers.push(header.clone());
        }
    }

    let mut right_by_key: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in &right.rows {
        if let Some(value) = row.get(right_key) {
            right_by_key.entry(value.trim()).or_insert(row);
        }
    }

    let mut merged = RawTable::new(left.name.clone(), headers);
    merged.skipped_rows = left.skipped_rows + right.skipped_rows;
    let right_width = right.headers.len() - 1;

    for row in &left.rows {
        let mut cells = row.clone();
        let matched = row
            .get(left_key)
            .and_then(|value| right_by_key.get(value.trim()));
        match matched {
            Some(right_row) => cells.extend(
                right_row
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != right_key)
                    .map(|(_, c)| c.clone()),
            ),
            None => cells.extend(std::iter::repeat(String::new()).take(right_width)),
        }
        merged.push_row(cells);
    }

    Ok(merged)
}
