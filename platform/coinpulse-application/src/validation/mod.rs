use crate::config::Config;
use crate::dashboard::{load_datasets, DatasetOutcome};
use coinpulse_domain::repositories::cache::DatasetCache;
use coinpulse_domain::repositories::datasets::{PriceRepository, SentimentRepository};
use coinpulse_domain::services::normalize::NormalizationReport;
use std::time::Instant;
use tracing::info_span;

pub fn validate(
    config: &Config,
    strict: bool,
    cache: &dyn DatasetCache,
    sentiment_repo: &dyn SentimentRepository,
    price_repo: &dyn PriceRepository,
) -> Result<serde_json::Value, String> {
    let _span = info_span!("validate", strict = strict, cache_dir = %config.cache.dir).entered();
    let stage_start = Instant::now();

    let loaded = load_datasets(config, cache, sentiment_repo, price_repo);
    metrics::histogram!("coinpulse.validate.load_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let limits = config.data_quality.as_ref();
    let max_unmapped_labels = limits.and_then(|l| l.max_unmapped_labels).unwrap_or(0);
    let max_dropped_rows = limits.and_then(|l| l.max_dropped_rows).unwrap_or(0);

    let mut violations = Vec::new();
    let mut datasets = serde_json::Map::new();
    for (name, outcome) in &loaded.outcomes {
        let entry = match outcome {
            DatasetOutcome::Loaded {
                source,
                report: Some(report),
            } => {
                if report.unmapped_labels > max_unmapped_labels {
                    violations.push(format!(
                        "{name}: {} unmapped labels (limit {max_unmapped_labels})",
                        report.unmapped_labels
                    ));
                }
                if report.dropped_rows() > max_dropped_rows {
                    violations.push(format!(
                        "{name}: {} dropped rows (limit {max_dropped_rows})",
                        report.dropped_rows()
                    ));
                }
                record_gauges(name, report);
                serde_json::json!({
                    "status": "loaded",
                    "fingerprint": source.fingerprint,
                    "bytes": source.bytes,
                    "quality": quality_json(report),
                })
            }
            DatasetOutcome::Loaded {
                source,
                report: None,
            } => serde_json::json!({
                "status": "loaded",
                "fingerprint": source.fingerprint,
                "bytes": source.bytes,
            }),
            DatasetOutcome::Failed {
                kind,
                error,
                recoverable,
            } => {
                violations.push(format!("{name}: failed to load ({kind})"));
                serde_json::json!({
                    "status": "failed",
                    "kind": kind,
                    "error": error,
                    "recoverable": recoverable,
                })
            }
        };
        datasets.insert(name.clone(), entry);
    }

    if strict && !violations.is_empty() {
        for violation in &violations {
            tracing::warn!(violation = %violation, "data quality limit exceeded");
        }
        return Err(format!(
            "strict validation failed: data quality limits exceeded ({})",
            violations.join("; ")
        ));
    }

    Ok(serde_json::json!({
        "datasets": datasets,
        "violations": violations,
        "limits": {
            "max_unmapped_labels": max_unmapped_labels,
            "max_dropped_rows": max_dropped_rows,
        },
        "strict": strict
    }))
}

fn record_gauges(dataset: &str, report: &NormalizationReport) {
    let dataset = dataset.to_string();
    metrics::gauge!("coinpulse.validate.rows_out", "dataset" => dataset.clone())
        .set(report.rows_out as f64);
    metrics::gauge!("coinpulse.validate.dropped_rows", "dataset" => dataset.clone())
        .set(report.dropped_rows() as f64);
    metrics::gauge!("coinpulse.validate.unmapped_labels", "dataset" => dataset)
        .set(report.unmapped_labels as f64);
}

fn quality_json(report: &NormalizationReport) -> serde_json::Value {
    serde_json::json!({
        "columns": report.columns,
        "date_column": report.date_column,
        "rows_in": report.rows_in,
        "rows_out": report.rows_out,
        "dropped_rows": report.dropped_rows(),
        "skipped_malformed_rows": report.skipped_malformed_rows,
        "dropped_invalid_date": report.dropped_invalid_date,
        "dropped_missing_entity": report.dropped_missing_entity,
        "dropped_invalid_price": report.dropped_invalid_price,
        "unmapped_labels": report.unmapped_labels,
        "unmapped_label_values": report.unmapped_label_values,
        "missing_confidence": report.missing_confidence,
        "invalid_confidence": report.invalid_confidence,
        "malformed_list_cells": report.malformed_list_cells,
        "first_date": report.first_date,
        "last_date": report.last_date,
    })
}
