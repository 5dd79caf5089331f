use super::entity_key;
use super::scores::SeriesPoint;
use crate::value_objects::price_point::PricePoint;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A series value with its price attached. `price` is `None` only in
/// left-join output, where it marks "no price available".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedPoint {
    pub entity: String,
    pub date: NaiveDate,
    pub value: f64,
    pub price: Option<f64>,
}

// last occurrence wins for duplicate (entity, date) keys
fn price_index(prices: &[PricePoint]) -> HashMap<(String, NaiveDate), f64> {
    prices
        .iter()
        .map(|p| ((entity_key(&p.entity_name), p.observed_at), p.price))
        .collect()
}

/// Inner join on (case-normalized entity, date); unmatched series points are dropped.
pub fn join_with_price(series: &[SeriesPoint], prices: &[PricePoint]) -> Vec<PricedPoint> {
    let index = price_index(prices);
    series
        .iter()
        .filter_map(|point| {
            index
                .get(&(entity_key(&point.entity), point.date))
                .map(|price| PricedPoint {
                    entity: point.entity.clone(),
                    date: point.date,
                    value: point.value,
                    price: Some(*price),
                })
        })
        .collect()
}

/// Left join: every series point is kept, unmatched ones carry `price: None`.
pub fn join_with_price_left(series: &[SeriesPoint], prices: &[PricePoint]) -> Vec<PricedPoint> {
    let index = price_index(prices);
    series
        .iter()
        .map(|point| PricedPoint {
            entity: point.entity.clone(),
            date: point.date,
            value: point.value,
            price: index.get(&(entity_key(&point.entity), point.date)).copied(),
        })
        .collect()
}

/// Most recent price per entity (grouped case-insensitively), ordered by entity key.
/// Within one date the last occurrence wins, matching the join index.
pub fn latest_prices(prices: &[PricePoint]) -> Vec<PricePoint> {
    let mut latest: BTreeMap<String, &PricePoint> = BTreeMap::new();
    for point in prices {
        let key = entity_key(&point.entity_name);
        let newer = latest
            .get(&key)
            .map_or(true, |current| point.observed_at >= current.observed_at);
        if newer {
            latest.insert(key, point);
        }
    }
    latest.into_values().cloned().collect()
}
