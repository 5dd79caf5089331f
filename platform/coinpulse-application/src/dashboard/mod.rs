mod loading;
mod views;

pub use loading::{load_datasets, DatasetOutcome, LoadedDatasets};
pub use views::{
    build_views, CategoryView, DashboardViews, HighConfidenceView, ScoreRow, ViewData,
};

use crate::config::{Config, DatasetKind};
use chrono::NaiveDate;
use coinpulse_domain::repositories::cache::DatasetCache;
use coinpulse_domain::repositories::datasets::{PriceRepository, SentimentRepository};
use coinpulse_domain::services::aggregation::{filter_price_window, filter_window, window_start};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, Serialize)]
pub struct DateWindow {
    pub days: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub datasets: BTreeMap<String, DatasetOutcome>,
    pub window: Option<DateWindow>,
    pub views: DashboardViews,
}

/// Which cached datasets a refresh discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSelection {
    One(DatasetKind),
    All,
}

impl DatasetSelection {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "sentiment" => Ok(DatasetSelection::One(DatasetKind::Sentiment)),
            "prices" => Ok(DatasetSelection::One(DatasetKind::Prices)),
            "posts" => Ok(DatasetSelection::One(DatasetKind::Posts)),
            "all" => Ok(DatasetSelection::All),
            other => Err(format!(
                "unsupported dataset: {other} (expected sentiment | prices | posts | all)"
            )),
        }
    }

    fn kinds(self) -> Vec<DatasetKind> {
        match self {
            DatasetSelection::One(kind) => vec![kind],
            DatasetSelection::All => DatasetKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Invalidation {
    pub dataset: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub invalidated: Vec<Invalidation>,
    pub dashboard: DashboardReport,
}

/// Fetch, load, normalize and aggregate every configured dataset.
///
/// Dataset failures are reported per dataset and never abort the build; only
/// an invalid view configuration is an error.
pub fn build_dashboard(
    config: &Config,
    cache: &dyn DatasetCache,
    sentiment_repo: &dyn SentimentRepository,
    price_repo: &dyn PriceRepository,
) -> Result<DashboardReport, String> {
    let _span = info_span!("dashboard.build", cache_dir = %config.cache.dir).entered();
    let start = Instant::now();
    let settings = config.view_settings()?;

    let loaded = load_datasets(config, cache, sentiment_repo, price_repo);

    let window = settings.window_days.and_then(|days| {
        let anchor = match (&loaded.records, &loaded.prices) {
            (Ok(records), _) if !records.is_empty() => records.iter().map(|r| r.observed_at).max(),
            (_, Ok(points)) => points.iter().map(|p| p.observed_at).max(),
            _ => None,
        }?;
        Some(DateWindow {
            days,
            start: window_start(anchor, days),
            end: Some(anchor),
        })
    });

    let (records, prices) = match &window {
        Some(w) => (
            loaded
                .records
                .map(|records| filter_window(&records, w.start, w.end)),
            loaded
                .prices
                .map(|points| filter_price_window(&points, w.start, w.end)),
        ),
        None => (loaded.records, loaded.prices),
    };

    let views = build_views(
        &settings,
        config.categories(),
        records.as_deref().map_err(String::as_str),
        prices.as_deref().map_err(String::as_str),
    );

    let ready = count_ready(&views);
    metrics::histogram!("coinpulse.dashboard.build_ms").record(start.elapsed().as_millis() as f64);
    metrics::gauge!("coinpulse.dashboard.views_ready").set(ready as f64);
    tracing::info!(
        views_ready = ready,
        loaded = loaded.outcomes.values().filter(|o| o.is_loaded()).count(),
        failed = loaded.outcomes.values().filter(|o| !o.is_loaded()).count(),
        "dashboard built"
    );

    Ok(DashboardReport {
        datasets: loaded.outcomes,
        window,
        views,
    })
}

/// Discard the cached copy of the selected dataset(s) and rebuild from scratch.
pub fn refresh(
    config: &Config,
    cache: &dyn DatasetCache,
    sentiment_repo: &dyn SentimentRepository,
    price_repo: &dyn PriceRepository,
    selection: DatasetSelection,
) -> Result<RefreshReport, String> {
    let _span = info_span!("dashboard.refresh", selection = ?selection).entered();

    let mut invalidated = Vec::new();
    for kind in selection.kinds() {
        let Some(spec) = config.dataset_spec(kind) else {
            continue;
        };
        let removed = cache.invalidate(&spec).map_err(|err| err.to_string())?;
        metrics::counter!("coinpulse.dashboard.refresh_total", "dataset" => kind.name())
            .increment(1);
        invalidated.push(Invalidation {
            dataset: spec.name,
            removed,
        });
    }

    let dashboard = build_dashboard(config, cache, sentiment_repo, price_repo)?;
    Ok(RefreshReport {
        invalidated,
        dashboard,
    })
}

fn count_ready(views: &DashboardViews) -> usize {
    let fixed = [
        views.top_mentioned.is_ready(),
        views.top_detected.is_ready(),
        views.sentiment_distribution.is_ready(),
        views.sentiment_trend.is_ready(),
        views.high_confidence.is_ready(),
        views.word_counts.is_ready(),
        views.sentiment_scores.is_ready(),
        views.latest_prices.is_ready(),
        views.price_overlay.is_ready(),
    ];
    fixed.iter().filter(|ready| **ready).count()
        + views
            .categories
            .iter()
            .filter(|c| c.distribution.is_ready())
            .count()
}

#[cfg(test)]
mod tests {
    use super::DatasetSelection;
    use crate::config::DatasetKind;

    #[test]
    fn selection_parses_names_and_all() {
        assert_eq!(
            DatasetSelection::parse(" Prices ").expect("prices"),
            DatasetSelection::One(DatasetKind::Prices)
        );
        assert_eq!(DatasetSelection::parse("all").expect("all"), DatasetSelection::All);
        assert!(DatasetSelection::parse("tweets").is_err());
    }
}
