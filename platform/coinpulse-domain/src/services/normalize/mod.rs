pub mod columns;
pub mod dates;
pub mod lists;

use crate::errors::DatasetError;
use crate::value_objects::comment_id::{is_null_cell, CommentId};
use crate::value_objects::price_point::PricePoint;
use crate::value_objects::raw_table::RawTable;
use crate::value_objects::sentiment_label::SentimentLabel;
use crate::value_objects::sentiment_record::SentimentRecord;
use chrono::NaiveDate;
use dates::{parse_date, resolve_date_column};
use lists::{classify_list_cell, ListCell};
use serde::Serialize;
use std::collections::BTreeMap;

const EMPTY_LABEL_KEY: &str = "<empty>";

#[derive(Debug, Default, Clone, Serialize)]
pub struct NormalizationReport {
    pub dataset: String,
    pub columns: Vec<String>,
    pub date_column: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub skipped_malformed_rows: usize,
    pub dropped_invalid_date: usize,
    pub dropped_missing_entity: usize,
    pub dropped_invalid_price: usize,
    pub unmapped_labels: usize,
    pub unmapped_label_values: BTreeMap<String, usize>,
    pub missing_confidence: usize,
    pub invalid_confidence: usize,
    pub malformed_list_cells: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl NormalizationReport {
    fn for_table(table: &RawTable, date_column: &str) -> Self {
        Self {
            dataset: table.name.clone(),
            columns: table.headers.clone(),
            date_column: date_column.to_string(),
            rows_in: table.len(),
            skipped_malformed_rows: table.skipped_rows,
            ..Self::default()
        }
    }

    /// Rows lost between the raw file and the normalized output.
    pub fn dropped_rows(&self) -> usize {
        self.skipped_malformed_rows
            + self.dropped_invalid_date
            + self.dropped_missing_entity
            + self.dropped_invalid_price
    }

    fn observe_date(&mut self, date: NaiveDate) {
        self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
        self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
    }

    fn record_unmapped(&mut self, raw: &str) {
        self.unmapped_labels += 1;
        let key = raw.trim().to_lowercase();
        let key = if key.is_empty() {
            EMPTY_LABEL_KEY.to_string()
        } else {
            key
        };
        *self.unmapped_label_values.entry(key).or_insert(0) += 1;
    }
}

fn require_column(
    table: &RawTable,
    aliases: &[&str],
    role: &str,
) -> Result<usize, DatasetError> {
    table.find_column(aliases).ok_or_else(|| {
        DatasetError::schema(
            &table.name,
            format!("missing {role} column (expected one of: {})", aliases.join(", ")),
            &table.headers,
        )
    })
}

fn date_index(table: &RawTable, date_column: &str) -> Result<usize, DatasetError> {
    table.column_index(date_column).ok_or_else(|| {
        DatasetError::schema(
            &table.name,
            format!("resolved date column `{date_column}` is not present"),
            &table.headers,
        )
    })
}

pub fn normalize_sentiment(
    table: &RawTable,
) -> Result<(Vec<SentimentRecord>, NormalizationReport), DatasetError> {
    let date_column = resolve_date_column(table)?;
    let date_idx = date_index(table, &date_column)?;
    let entity_idx = require_column(table, columns::SENTIMENT_ENTITY, "entity")?;
    let label_idx = require_column(table, columns::SENTIMENT_LABEL, "sentiment label")?;
    let confidence_idx = table.find_column(columns::SENTIMENT_CONFIDENCE);
    let detected_idx = table.find_column(columns::DETECTED_ENTITIES);
    let comment_idx = table.find_column(columns::COMMENT_ID);

    let mut report = NormalizationReport::for_table(table, &date_column);
    let mut records = Vec::with_capacity(table.len());

    for row in table.iter() {
        let Some(observed_at) = row.cell(date_idx).and_then(parse_date) else {
            report.dropped_invalid_date += 1;
            continue;
        };

        let entity = row.cell(entity_idx).unwrap_or("").trim();
        if is_null_cell(entity) {
            report.dropped_missing_entity += 1;
            continue;
        }

        let raw_label = row.cell(label_idx).unwrap_or("");
        let sentiment_label = match SentimentLabel::parse(raw_label) {
            Some(label) => label,
            None => {
                report.record_unmapped(raw_label);
                SentimentLabel::Neutral
            }
        };

        let sentiment_confidence = match confidence_idx.and_then(|idx| row.cell(idx)) {
            Some(raw) if !is_null_cell(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && (0.0..=1.0).contains(&value) => Some(value),
                _ => {
                    report.invalid_confidence += 1;
                    None
                }
            },
            _ => {
                report.missing_confidence += 1;
                None
            }
        };

        let detected_entities = match detected_idx.and_then(|idx| row.cell(idx)) {
            Some(raw) => match classify_list_cell(raw) {
                ListCell::Items(items) => items,
                ListCell::NotAList => Vec::new(),
                ListCell::Malformed => {
                    report.malformed_list_cells += 1;
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        report.observe_date(observed_at);
        records.push(SentimentRecord {
            entity_name: entity.to_string(),
            detected_entities,
            observed_at,
            sentiment_label,
            sentiment_confidence,
            comment_id: CommentId::from_cell(comment_idx.and_then(|idx| row.cell(idx))),
        });
    }

    report.rows_out = records.len();
    Ok((records, report))
}

pub fn normalize_prices(
    table: &RawTable,
) -> Result<(Vec<PricePoint>, NormalizationReport), DatasetError> {
    let date_column = resolve_date_column(table)?;
    let date_idx = date_index(table, &date_column)?;
    let entity_idx = require_column(table, columns::PRICE_ENTITY, "entity")?;
    let price_idx = require_column(table, columns::PRICE_VALUE, "price")?;

    let mut report = NormalizationReport::for_table(table, &date_column);
    let mut points = Vec::with_capacity(table.len());

    for row in table.iter() {
        let Some(observed_at) = row.cell(date_idx).and_then(parse_date) else {
            report.dropped_invalid_date += 1;
            continue;
        };

        let entity = row.cell(entity_idx).unwrap_or("").trim();
        if is_null_cell(entity) {
            report.dropped_missing_entity += 1;
            continue;
        }

        let price = match row.cell(price_idx).map(|raw| raw.trim().parse::<f64>()) {
            Some(Ok(value)) if value.is_finite() && value >= 0.0 => value,
            _ => {
                report.dropped_invalid_price += 1;
                continue;
            }
        };

        report.observe_date(observed_at);
        points.push(PricePoint {
            entity_name: entity.to_string(),
            observed_at,
            price,
        });
    }

    report.rows_out = points.len();
    Ok((points, report))
}
