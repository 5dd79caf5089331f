use super::entity_key;
use super::scores::SeriesPoint;
use crate::value_objects::sentiment_record::SentimentRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    pub entity: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySeries {
    pub entity: String,
    pub points: Vec<DailyCount>,
}

impl EntitySeries {
    pub fn total(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }

    pub fn to_series_points(&self) -> Vec<SeriesPoint> {
        self.points
            .iter()
            .map(|p| SeriesPoint {
                entity: self.entity.clone(),
                date: p.date,
                value: p.count as f64,
            })
            .collect()
    }
}

/// Entities ranked by record count, descending; ties keep first-seen order.
pub fn top_mentioned(records: &[SentimentRecord], n: usize) -> Vec<EntityCount> {
    rank(records.iter().map(|r| r.entity_name.as_str()), n)
}

/// Same ranking as [`top_mentioned`], over the detected-entity lists.
pub fn top_detected(records: &[SentimentRecord], n: usize) -> Vec<EntityCount> {
    rank(
        records
            .iter()
            .flat_map(|r| r.detected_entities.iter().map(|e| e.as_str())),
        n,
    )
}

fn rank<'a>(names: impl Iterator<Item = &'a str>, n: usize) -> Vec<EntityCount> {
    let mut ranked: Vec<EntityCount> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for name in names {
        match index.get(name).copied() {
            Some(idx) => ranked[idx].count += 1,
            None => {
                index.insert(name, ranked.len());
                ranked.push(EntityCount {
                    entity: name.to_string(),
                    count: 1,
                });
            }
        }
    }
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Daily mention counts per allow-listed entity.
///
/// A record mentions an entity when its `entity_name` or one of its detected
/// entities matches case-insensitively; it counts once per record. Every
/// series spans all dates present in `records`, so unmatched entities get an
/// all-zero series.
pub fn word_count_series(records: &[SentimentRecord], entities: &[String]) -> Vec<EntitySeries> {
    let dates: BTreeSet<NaiveDate> = records.iter().map(|r| r.observed_at).collect();

    entities
        .iter()
        .map(|entity| {
            let key = entity_key(entity);
            let mut per_day: BTreeMap<NaiveDate, usize> = dates.iter().map(|d| (*d, 0)).collect();
            for record in records.iter().filter(|r| mentions(r, &key)) {
                *per_day.entry(record.observed_at).or_insert(0) += 1;
            }
            EntitySeries {
                entity: entity.clone(),
                points: per_day
                    .into_iter()
                    .map(|(date, count)| DailyCount { date, count })
                    .collect(),
            }
        })
        .collect()
}

fn mentions(record: &SentimentRecord, key: &str) -> bool {
    entity_key(&record.entity_name) == key
        || record
            .detected_entities
            .iter()
            .any(|detected| entity_key(detected) == key)
}
