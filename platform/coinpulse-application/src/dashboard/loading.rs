use crate::config::{Config, DatasetKind};
use coinpulse_domain::errors::DatasetError;
use coinpulse_domain::repositories::cache::{CachedDataset, DatasetCache};
use coinpulse_domain::repositories::datasets::{
    DatasetQuery, MergeSource, PriceRepository, SentimentRepository,
};
use coinpulse_domain::services::normalize::NormalizationReport;
use coinpulse_domain::value_objects::price_point::PricePoint;
use coinpulse_domain::value_objects::sentiment_record::SentimentRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetOutcome {
    Loaded {
        source: CachedDataset,
        report: Option<NormalizationReport>,
    },
    Failed {
        kind: String,
        error: String,
        recoverable: bool,
    },
}

impl DatasetOutcome {
    fn failed(err: &DatasetError) -> Self {
        DatasetOutcome::Failed {
            kind: err.kind().to_string(),
            error: err.to_string(),
            recoverable: err.is_recoverable(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, DatasetOutcome::Loaded { .. })
    }
}

/// Everything one pass read from the cache, independent per dataset.
pub struct LoadedDatasets {
    pub outcomes: BTreeMap<String, DatasetOutcome>,
    pub records: Result<Vec<SentimentRecord>, String>,
    pub prices: Result<Vec<PricePoint>, String>,
}

pub fn load_datasets(
    config: &Config,
    cache: &dyn DatasetCache,
    sentiment_repo: &dyn SentimentRepository,
    price_repo: &dyn PriceRepository,
) -> LoadedDatasets {
    let mut outcomes = BTreeMap::new();

    // posts only feed the sentiment merge; a failure there degrades to an unmerged load
    let merge = match config.dataset_spec(DatasetKind::Posts) {
        None => None,
        Some(spec) => match cache.fetch(&spec) {
            Ok(cached) => {
                let merge = MergeSource {
                    path: cached.path.clone(),
                    key: config.merge_key(),
                };
                outcomes.insert(
                    spec.name.clone(),
                    DatasetOutcome::Loaded {
                        source: cached,
                        report: None,
                    },
                );
                Some(merge)
            }
            Err(err) => {
                tracing::warn!(error = %err, "posts dataset unavailable; loading sentiment without merge");
                outcomes.insert(spec.name.clone(), DatasetOutcome::failed(&err));
                None
            }
        },
    };

    let records = load_one(config, cache, DatasetKind::Sentiment, &mut outcomes, |cached| {
        sentiment_repo.load_sentiment(&DatasetQuery {
            name: DatasetKind::Sentiment.name().to_string(),
            path: cached.path.clone(),
            merge: merge.clone(),
        })
    });

    let prices = load_one(config, cache, DatasetKind::Prices, &mut outcomes, |cached| {
        price_repo.load_prices(&DatasetQuery {
            name: DatasetKind::Prices.name().to_string(),
            path: cached.path.clone(),
            merge: None,
        })
    });

    LoadedDatasets {
        outcomes,
        records,
        prices,
    }
}

fn load_one<T>(
    config: &Config,
    cache: &dyn DatasetCache,
    kind: DatasetKind,
    outcomes: &mut BTreeMap<String, DatasetOutcome>,
    load: impl FnOnce(&CachedDataset) -> Result<(Vec<T>, NormalizationReport), DatasetError>,
) -> Result<Vec<T>, String> {
    let name = kind.name();
    let Some(spec) = config.dataset_spec(kind) else {
        return Err(format!("dataset {name} is not configured"));
    };
    let _span = tracing::info_span!("dashboard.load_dataset", dataset = %name).entered();
    let start = Instant::now();

    let result = cache
        .fetch(&spec)
        .and_then(|cached| load(&cached).map(|(items, report)| (cached, items, report)));
    metrics::histogram!("coinpulse.dashboard.load_dataset_ms", "dataset" => name)
        .record(start.elapsed().as_millis() as f64);

    match result {
        Ok((cached, items, report)) => {
            metrics::gauge!("coinpulse.dashboard.rows", "dataset" => name).set(items.len() as f64);
            outcomes.insert(
                name.to_string(),
                DatasetOutcome::Loaded {
                    source: cached,
                    report: Some(report),
                },
            );
            Ok(items)
        }
        Err(err) => {
            metrics::counter!(
                "coinpulse.dashboard.dataset_failures_total",
                "dataset" => name,
                "kind" => err.kind()
            )
            .increment(1);
            tracing::warn!(error = %err, recoverable = err.is_recoverable(), "dataset failed to load");
            outcomes.insert(name.to_string(), DatasetOutcome::failed(&err));
            Err(err.to_string())
        }
    }
}
