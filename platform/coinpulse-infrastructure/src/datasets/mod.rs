use crate::tables::read_table;
use coinpulse_domain::errors::DatasetError;
use coinpulse_domain::repositories::datasets::{
    DatasetQuery, PriceRepository, SentimentRepository,
};
use coinpulse_domain::services::merge::merge_left;
use coinpulse_domain::services::normalize::{
    normalize_prices, normalize_sentiment, NormalizationReport,
};
use coinpulse_domain::value_objects::price_point::PricePoint;
use coinpulse_domain::value_objects::raw_table::RawTable;
use coinpulse_domain::value_objects::sentiment_record::SentimentRecord;
use std::time::Instant;

/// Reads pipe-delimited exports from disk and normalizes them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemDatasetRepository;

impl FilesystemDatasetRepository {
    pub fn new() -> Self {
        Self
    }

    fn load_raw(&self, query: &DatasetQuery) -> Result<RawTable, DatasetError> {
        let table = read_table(&query.path, &query.name)?;
        let Some(merge) = &query.merge else {
            return Ok(table);
        };
        let posts = read_table(&merge.path, &format!("{}:posts", query.name))?;
        let merged = merge_left(&table, &posts, &merge.key)?;
        tracing::debug!(
            key = %merge.key,
            posts_rows = posts.len(),
            columns = merged.headers.len(),
            "merged posts table"
        );
        Ok(merged)
    }
}

fn record_load_metrics(
    kind: &'static str,
    start: Instant,
    result: &Result<NormalizationReport, DatasetError>,
) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!("coinpulse.infra.datasets.load_total", "kind" => kind, "result" => result_label)
        .increment(1);
    metrics::histogram!("coinpulse.infra.datasets.load_ms", "kind" => kind)
        .record(start.elapsed().as_millis() as f64);
    if let Ok(report) = result {
        metrics::counter!("coinpulse.infra.datasets.rows_out_total", "kind" => kind)
            .increment(report.rows_out as u64);
        metrics::counter!("coinpulse.infra.datasets.dropped_rows_total", "kind" => kind)
            .increment(report.dropped_rows() as u64);
        metrics::counter!("coinpulse.infra.datasets.unmapped_labels_total", "kind" => kind)
            .increment(report.unmapped_labels as u64);
    }
}

impl SentimentRepository for FilesystemDatasetRepository {
    fn load_sentiment(
        &self,
        query: &DatasetQuery,
    ) -> Result<(Vec<SentimentRecord>, NormalizationReport), DatasetError> {
        let _span = tracing::info_span!(
            "infra.datasets.load_sentiment",
            dataset = %query.name,
            path = %query.path.display()
        )
        .entered();
        let start = Instant::now();

        let result = self.load_raw(query).and_then(|table| normalize_sentiment(&table));
        let report = result.as_ref().map(|(_, report)| report.clone()).map_err(Clone::clone);
        record_load_metrics("sentiment", start, &report);

        if let Ok((records, report)) = &result {
            if report.unmapped_labels > 0 {
                tracing::warn!(
                    unmapped = report.unmapped_labels,
                    values = ?report.unmapped_label_values,
                    "sentiment labels outside both vocabularies were read as neutral"
                );
            }
            tracing::info!(
                records = records.len(),
                dropped = report.dropped_rows(),
                date_column = %report.date_column,
                "loaded sentiment dataset"
            );
        }
        result
    }
}

impl PriceRepository for FilesystemDatasetRepository {
    fn load_prices(
        &self,
        query: &DatasetQuery,
    ) -> Result<(Vec<PricePoint>, NormalizationReport), DatasetError> {
        let _span = tracing::info_span!(
            "infra.datasets.load_prices",
            dataset = %query.name,
            path = %query.path.display()
        )
        .entered();
        let start = Instant::now();

        let result = self.load_raw(query).and_then(|table| normalize_prices(&table));
        let report = result.as_ref().map(|(_, report)| report.clone()).map_err(Clone::clone);
        record_load_metrics("prices", start, &report);

        if let Ok((points, report)) = &result {
            tracing::info!(
                points = points.len(),
                dropped = report.dropped_rows(),
                date_column = %report.date_column,
                "loaded price dataset"
            );
        }
        result
    }
}
