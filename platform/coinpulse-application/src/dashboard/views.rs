use crate::config::{CategoryConfig, JoinMode, ViewSettings};
use coinpulse_domain::services::aggregation::{
    daily_mean_sentiment, filter_entities, high_confidence_subset, join_with_price,
    join_with_price_left, latest_prices, mean_sentiment_score, sentiment_distribution,
    sentiment_trend, stdev_sentiment_score, top_detected, top_mentioned, word_count_series,
    EntityCount, EntitySeries, PricedPoint, TrendPoint,
};
use coinpulse_domain::value_objects::label_counts::LabelCounts;
use coinpulse_domain::value_objects::price_point::PricePoint;
use coinpulse_domain::value_objects::score_stat::ScoreStat;
use coinpulse_domain::value_objects::sentiment_record::SentimentRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// One rendered panel: data, an explicit empty state, or the reason its input is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewData<T> {
    Ready { data: T },
    NoData,
    Unavailable { reason: String },
}

impl<T> ViewData<T> {
    fn from_data(data: T, empty: bool) -> Self {
        if empty {
            ViewData::NoData
        } else {
            ViewData::Ready { data }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewData::Ready { data } => Some(data),
            ViewData::NoData | ViewData::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewData::Ready { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighConfidenceView {
    pub threshold: f64,
    pub count: usize,
    pub distribution: BTreeMap<String, LabelCounts>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub entity: String,
    pub observations: usize,
    pub mean: f64,
    pub stdev: ScoreStat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub entities: Vec<String>,
    pub distribution: ViewData<BTreeMap<String, LabelCounts>>,
    pub trend: ViewData<Vec<TrendPoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub top_mentioned: ViewData<Vec<EntityCount>>,
    pub top_detected: ViewData<Vec<EntityCount>>,
    pub sentiment_distribution: ViewData<BTreeMap<String, LabelCounts>>,
    pub sentiment_trend: ViewData<Vec<TrendPoint>>,
    pub high_confidence: ViewData<HighConfidenceView>,
    pub word_counts: ViewData<Vec<EntitySeries>>,
    pub sentiment_scores: ViewData<Vec<ScoreRow>>,
    pub latest_prices: ViewData<Vec<PricePoint>>,
    pub price_overlay: ViewData<Vec<PricedPoint>>,
    pub categories: Vec<CategoryView>,
}

pub fn build_views(
    settings: &ViewSettings,
    categories: &[CategoryConfig],
    records: Result<&[SentimentRecord], &str>,
    prices: Result<&[PricePoint], &str>,
) -> DashboardViews {
    let latest_prices = match prices {
        Ok(points) => {
            let latest = latest_prices(points);
            let empty = latest.is_empty();
            ViewData::from_data(latest, empty)
        }
        Err(reason) => unavailable("prices", reason),
    };

    let records = match records {
        Ok(records) => records,
        Err(reason) => {
            return DashboardViews {
                top_mentioned: unavailable("sentiment", reason),
                top_detected: unavailable("sentiment", reason),
                sentiment_distribution: unavailable("sentiment", reason),
                sentiment_trend: unavailable("sentiment", reason),
                high_confidence: unavailable("sentiment", reason),
                word_counts: unavailable("sentiment", reason),
                sentiment_scores: unavailable("sentiment", reason),
                latest_prices,
                price_overlay: unavailable("sentiment", reason),
                categories: categories
                    .iter()
                    .map(|category| CategoryView {
                        name: category.name.clone(),
                        entities: category.entities.clone(),
                        distribution: unavailable("sentiment", reason),
                        trend: unavailable("sentiment", reason),
                    })
                    .collect(),
            };
        }
    };

    let top = top_mentioned(records, settings.top_n);
    let watchlist: Vec<String> = if settings.watchlist.is_empty() {
        top.iter().map(|e| e.entity.clone()).collect()
    } else {
        settings.watchlist.clone()
    };

    let detected = top_detected(records, settings.top_n);
    let distribution = sentiment_distribution(records);
    let trend = sentiment_trend(records, settings.bucket);

    let confident = high_confidence_subset(records, settings.confidence_threshold);
    let high_confidence = ViewData::from_data(
        HighConfidenceView {
            threshold: settings.confidence_threshold,
            count: confident.len(),
            distribution: sentiment_distribution(&confident),
        },
        confident.is_empty(),
    );

    let word_counts = word_count_series(records, &watchlist);
    let no_mentions = word_counts.iter().all(|series| series.total() == 0);

    let scores = score_rows(records);

    let price_overlay = match prices {
        Ok(points) => {
            let series = daily_mean_sentiment(records);
            let joined = match settings.join {
                JoinMode::Inner => join_with_price(&series, points),
                JoinMode::Left => join_with_price_left(&series, points),
            };
            let empty = joined.is_empty();
            ViewData::from_data(joined, empty)
        }
        Err(reason) => unavailable("prices", reason),
    };

    let categories = categories
        .iter()
        .map(|category| {
            let subset = filter_entities(records, &category.entities);
            let empty = subset.is_empty();
            CategoryView {
                name: category.name.clone(),
                entities: category.entities.clone(),
                distribution: ViewData::from_data(sentiment_distribution(&subset), empty),
                trend: ViewData::from_data(sentiment_trend(&subset, settings.bucket), empty),
            }
        })
        .collect();

    let empty = records.is_empty();
    DashboardViews {
        top_mentioned: ViewData::from_data(top, empty),
        top_detected: {
            let none = detected.is_empty();
            ViewData::from_data(detected, none)
        },
        sentiment_distribution: ViewData::from_data(distribution, empty),
        sentiment_trend: ViewData::from_data(trend, empty),
        high_confidence,
        word_counts: ViewData::from_data(word_counts, no_mentions),
        sentiment_scores: ViewData::from_data(scores, empty),
        latest_prices,
        price_overlay,
        categories,
    }
}

fn unavailable<T>(dataset: &str, reason: &str) -> ViewData<T> {
    ViewData::Unavailable {
        reason: format!("{dataset} dataset unavailable: {reason}"),
    }
}

fn score_rows(records: &[SentimentRecord]) -> Vec<ScoreRow> {
    let means = mean_sentiment_score(records);
    let stdevs = stdev_sentiment_score(records);
    let mut observations: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *observations.entry(record.entity_name.as_str()).or_insert(0) += 1;
    }
    means
        .into_iter()
        .map(|(entity, mean)| ScoreRow {
            observations: observations.get(entity.as_str()).copied().unwrap_or(0),
            stdev: stdevs
                .get(&entity)
                .copied()
                .unwrap_or(ScoreStat::InsufficientData),
            mean,
            entity,
        })
        .collect()
}
