use super::entity_key;
use crate::value_objects::score_stat::ScoreStat;
use crate::value_objects::sentiment_record::SentimentRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub entity: String,
    pub date: NaiveDate,
    pub value: f64,
}

fn scores_by_entity(records: &[SentimentRecord]) -> BTreeMap<&str, Vec<f64>> {
    let mut out: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        out.entry(record.entity_name.as_str())
            .or_default()
            .push(f64::from(record.sentiment_label.score()));
    }
    out
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn mean_sentiment_score(records: &[SentimentRecord]) -> BTreeMap<String, f64> {
    scores_by_entity(records)
        .into_iter()
        .map(|(entity, scores)| (entity.to_string(), mean(&scores)))
        .collect()
}

/// Sample standard deviation (n - 1) of the label score per entity. A single
/// observation yields [`ScoreStat::InsufficientData`].
pub fn stdev_sentiment_score(records: &[SentimentRecord]) -> BTreeMap<String, ScoreStat> {
    scores_by_entity(records)
        .into_iter()
        .map(|(entity, scores)| {
            let stat = if scores.len() < 2 {
                ScoreStat::InsufficientData
            } else {
                let m = mean(&scores);
                let var = scores.iter().map(|s| (s - m).powi(2)).sum::<f64>()
                    / (scores.len() - 1) as f64;
                ScoreStat::Value(var.sqrt())
            };
            (entity.to_string(), stat)
        })
        .collect()
}

/// Mean label score per (entity, day), ordered by entity key then date.
///
/// Spellings that differ only in case or surrounding whitespace share one
/// point, labelled with the first spelling seen.
pub fn daily_mean_sentiment(records: &[SentimentRecord]) -> Vec<SeriesPoint> {
    let mut grouped: BTreeMap<(String, NaiveDate), (&str, f64, usize)> = BTreeMap::new();
    for record in records {
        let slot = grouped
            .entry((entity_key(&record.entity_name), record.observed_at))
            .or_insert((record.entity_name.as_str(), 0.0, 0));
        slot.1 += f64::from(record.sentiment_label.score());
        slot.2 += 1;
    }
    grouped
        .into_iter()
        .map(|((_, date), (entity, sum, n))| SeriesPoint {
            entity: entity.to_string(),
            date,
            value: sum / n as f64,
        })
        .collect()
}
