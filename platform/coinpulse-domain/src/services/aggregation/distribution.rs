use crate::value_objects::label_counts::LabelCounts;
use crate::value_objects::sentiment_record::SentimentRecord;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    Week,
    Month,
}

impl Bucket {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "day" | "1d" | "daily" => Ok(Bucket::Day),
            "week" | "1w" | "weekly" => Ok(Bucket::Week),
            "month" | "1mo" | "monthly" => Ok(Bucket::Month),
            _ => Err(format!("unsupported bucket: {value} (expected day | week | month)")),
        }
    }

    /// First calendar day of the bucket containing `date` (weeks start on Monday).
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Bucket::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub counts: LabelCounts,
}

/// Label counts per entity. Every label is present, zero when unobserved.
pub fn sentiment_distribution(records: &[SentimentRecord]) -> BTreeMap<String, LabelCounts> {
    let mut out: BTreeMap<String, LabelCounts> = BTreeMap::new();
    for record in records {
        out.entry(record.entity_name.clone())
            .or_default()
            .increment(record.sentiment_label);
    }
    out
}

/// Label counts per bucket, ascending by bucket start. Buckets without any
/// record are not synthesized.
pub fn sentiment_trend(records: &[SentimentRecord], bucket: Bucket) -> Vec<TrendPoint> {
    let mut by_bucket: BTreeMap<NaiveDate, LabelCounts> = BTreeMap::new();
    for record in records {
        by_bucket
            .entry(bucket.start_of(record.observed_at))
            .or_default()
            .increment(record.sentiment_label);
    }
    by_bucket
        .into_iter()
        .map(|(date, counts)| TrendPoint { date, counts })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{sentiment_distribution, sentiment_trend, Bucket};
    use crate::value_objects::comment_id::CommentId;
    use crate::value_objects::label_counts::LabelCounts;
    use crate::value_objects::sentiment_label::SentimentLabel;
    use crate::value_objects::sentiment_record::SentimentRecord;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn record(entity: &str, date: NaiveDate, label: SentimentLabel, confidence: f64) -> SentimentRecord {
        SentimentRecord {
            entity_name: entity.to_string(),
            detected_entities: Vec::new(),
            observed_at: date,
            sentiment_label: label,
            sentiment_confidence: Some(confidence),
            comment_id: CommentId::Missing,
        }
    }

    #[test]
    fn distribution_has_explicit_zero_for_unseen_labels() {
        let records = vec![
            record("Bitcoin", day(2024, 11, 1), SentimentLabel::Bullish, 0.9),
            record("Bitcoin", day(2024, 11, 1), SentimentLabel::Bearish, 0.5),
        ];
        let dist = sentiment_distribution(&records);
        assert_eq!(dist.len(), 1);
        assert_eq!(
            dist["Bitcoin"],
            LabelCounts {
                bullish: 1,
                bearish: 1,
                neutral: 0
            }
        );
    }

    #[test]
    fn trend_is_sorted_and_does_not_fill_gaps() {
        let records = vec![
            record("Bitcoin", day(2024, 11, 5), SentimentLabel::Bullish, 0.9),
            record("Solana", day(2024, 11, 1), SentimentLabel::Neutral, 0.9),
            record("Bitcoin", day(2024, 11, 5), SentimentLabel::Bullish, 0.9),
        ];
        let trend = sentiment_trend(&records, Bucket::Day);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, day(2024, 11, 1));
        assert_eq!(trend[0].counts.neutral, 1);
        assert_eq!(trend[0].counts.bullish, 0);
        assert_eq!(trend[1].counts.bullish, 2);
    }

    #[test]
    fn week_and_month_buckets_align_to_period_start() {
        // 2024-11-06 is a Wednesday
        assert_eq!(Bucket::Week.start_of(day(2024, 11, 6)), day(2024, 11, 4));
        assert_eq!(Bucket::Week.start_of(day(2024, 11, 4)), day(2024, 11, 4));
        assert_eq!(Bucket::Month.start_of(day(2024, 11, 30)), day(2024, 11, 1));

        let records = vec![
            record("Bitcoin", day(2024, 11, 4), SentimentLabel::Bullish, 0.9),
            record("Bitcoin", day(2024, 11, 10), SentimentLabel::Bearish, 0.9),
            record("Bitcoin", day(2024, 11, 11), SentimentLabel::Bearish, 0.9),
        ];
        let weekly = sentiment_trend(&records, Bucket::Week);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].counts.total(), 2);
        assert_eq!(Bucket::parse("Weekly"), Ok(Bucket::Week));
        assert!(Bucket::parse("hourly").is_err());
    }
}
