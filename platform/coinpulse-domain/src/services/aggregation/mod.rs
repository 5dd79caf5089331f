//! Pure views over normalized records. Every function is total: empty input
//! yields an empty (or zero-filled) result.

pub mod distribution;
pub mod filters;
pub mod mentions;
pub mod price;
pub mod scores;

pub use distribution::{sentiment_distribution, sentiment_trend, Bucket, TrendPoint};
pub use filters::{
    filter_entities, filter_price_window, filter_window, high_confidence_subset, trailing_window,
    window_start,
};
pub use mentions::{
    top_detected, top_mentioned, word_count_series, DailyCount, EntityCount, EntitySeries,
};
pub use price::{join_with_price, join_with_price_left, latest_prices, PricedPoint};
pub use scores::{
    daily_mean_sentiment, mean_sentiment_score, stdev_sentiment_score, SeriesPoint,
};

/// Case-normalized entity name used wherever two sources are matched.
pub fn entity_key(name: &str) -> String {
    name.trim().to_lowercase()
}
