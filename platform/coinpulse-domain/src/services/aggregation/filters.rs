use super::entity_key;
use crate::value_objects::price_point::PricePoint;
use crate::value_objects::sentiment_record::SentimentRecord;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

/// Directional records whose confidence clears `threshold`. Neutral and
/// confidence-missing records never qualify.
pub fn high_confidence_subset(records: &[SentimentRecord], threshold: f64) -> Vec<SentimentRecord> {
    records
        .iter()
        .filter(|r| r.sentiment_label.is_directional())
        .filter(|r| matches!(r.sentiment_confidence, Some(c) if c >= threshold))
        .cloned()
        .collect()
}

/// Records whose entity is in `allow` (case-insensitive).
pub fn filter_entities(records: &[SentimentRecord], allow: &[String]) -> Vec<SentimentRecord> {
    let keys: HashSet<String> = allow.iter().map(|e| entity_key(e)).collect();
    records
        .iter()
        .filter(|r| keys.contains(&entity_key(&r.entity_name)))
        .cloned()
        .collect()
}

/// Inclusive date window; an absent bound is open.
pub fn filter_window(
    records: &[SentimentRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<SentimentRecord> {
    records
        .iter()
        .filter(|r| start.map_or(true, |s| r.observed_at >= s))
        .filter(|r| end.map_or(true, |e| r.observed_at <= e))
        .cloned()
        .collect()
}

/// Price points inside the inclusive window; an absent bound is open.
pub fn filter_price_window(
    points: &[PricePoint],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<PricePoint> {
    points
        .iter()
        .filter(|p| start.map_or(true, |s| p.observed_at >= s))
        .filter(|p| end.map_or(true, |e| p.observed_at <= e))
        .cloned()
        .collect()
}

/// The last `days` calendar days ending at the latest observed date.
pub fn trailing_window(records: &[SentimentRecord], days: u32) -> Vec<SentimentRecord> {
    let Some(latest) = records.iter().map(|r| r.observed_at).max() else {
        return Vec::new();
    };
    filter_window(records, window_start(latest, days), Some(latest))
}

/// First day of a `days`-long window ending at `latest`; `None` when the
/// window reaches past the earliest representable date.
pub fn window_start(latest: NaiveDate, days: u32) -> Option<NaiveDate> {
    let span = i64::from(days.max(1)) - 1;
    latest.checked_sub_signed(Duration::days(span))
}
