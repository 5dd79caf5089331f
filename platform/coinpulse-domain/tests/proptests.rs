use chrono::NaiveDate;
use coinpulse_domain::services::aggregation::{
    high_confidence_subset, sentiment_distribution, sentiment_trend, top_mentioned, Bucket,
};
use coinpulse_domain::services::normalize::lists::parse_list_cell;
use coinpulse_domain::services::normalize::normalize_sentiment;
use coinpulse_domain::value_objects::comment_id::CommentId;
use coinpulse_domain::value_objects::raw_table::RawTable;
use coinpulse_domain::value_objects::sentiment_label::SentimentLabel;
use coinpulse_domain::value_objects::sentiment_record::SentimentRecord;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

const ENTITIES: &[&str] = &["Bitcoin", "Ethereum", "Solana", "Cardano", "Dogecoin"];

fn label_strategy() -> impl Strategy<Value = SentimentLabel> {
    prop_oneof![
        Just(SentimentLabel::Bullish),
        Just(SentimentLabel::Bearish),
        Just(SentimentLabel::Neutral),
    ]
}

fn record_strategy() -> impl Strategy<Value = SentimentRecord> {
    (
        0usize..ENTITIES.len(),
        0u32..60,
        label_strategy(),
        prop::option::of(0.0f64..=1.0),
    )
        .prop_map(|(entity, offset, label, confidence)| SentimentRecord {
            entity_name: ENTITIES[entity].to_string(),
            detected_entities: Vec::new(),
            observed_at: NaiveDate::from_ymd_opt(2024, 10, 1).expect("date")
                + chrono::Duration::days(i64::from(offset)),
            sentiment_label: label,
            sentiment_confidence: confidence,
            comment_id: CommentId::Missing,
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn normalizer_keeps_exactly_the_rows_with_parseable_dates(
        rows in prop::collection::vec((any::<bool>(), 1u32..28, 0usize..5), 0..60)
    ) {
        let mut table = RawTable::new(
            "prop",
            vec!["date".to_string(), "crypto".to_string(), "sentiment".to_string()],
        );
        let mut expected = 0usize;
        for (valid, day, entity) in &rows {
            let date = if *valid {
                expected += 1;
                format!("2024-11-{day:02}")
            } else {
                format!("bad-{day}")
            };
            table.push_row(vec![date, ENTITIES[*entity].to_string(), "bullish".to_string()]);
        }

        match normalize_sentiment(&table) {
            Ok((records, report)) => {
                prop_assert_eq!(records.len(), expected);
                prop_assert_eq!(report.dropped_invalid_date, rows.len() - expected);
                let lo = NaiveDate::from_ymd_opt(2024, 11, 1).expect("date");
                let hi = NaiveDate::from_ymd_opt(2024, 11, 27).expect("date");
                prop_assert!(records.iter().all(|r| r.observed_at >= lo && r.observed_at <= hi));
            }
            Err(err) => prop_assert!(false, "unexpected error: {}", err),
        }
    }

    #[test]
    fn distribution_counts_sum_to_records_per_entity(
        records in prop::collection::vec(record_strategy(), 0..120)
    ) {
        let dist = sentiment_distribution(&records);
        let mut per_entity: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &records {
            *per_entity.entry(r.entity_name.as_str()).or_insert(0) += 1;
        }
        prop_assert_eq!(dist.len(), per_entity.len());
        for (entity, counts) in &dist {
            prop_assert_eq!(counts.total(), per_entity[entity.as_str()]);
        }

        let trend_total: usize = sentiment_trend(&records, Bucket::Day)
            .iter()
            .map(|p| p.counts.total())
            .sum();
        prop_assert_eq!(trend_total, records.len());
    }

    #[test]
    fn zero_threshold_keeps_every_directional_record_with_confidence(
        records in prop::collection::vec(record_strategy(), 0..80)
    ) {
        let directional: Vec<SentimentRecord> = records
            .into_iter()
            .filter(|r| r.sentiment_label.is_directional())
            .map(|mut r| {
                r.sentiment_confidence = Some(r.sentiment_confidence.unwrap_or(0.5));
                r
            })
            .collect();
        prop_assert_eq!(high_confidence_subset(&directional, 0.0), directional);
    }

    #[test]
    fn top_mentioned_is_bounded_and_descending(
        records in prop::collection::vec(record_strategy(), 0..80),
        n in 0usize..8
    ) {
        let distinct: HashSet<&str> = records.iter().map(|r| r.entity_name.as_str()).collect();
        let top = top_mentioned(&records, n);
        prop_assert_eq!(top.len(), n.min(distinct.len()));
        prop_assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn list_parsing_never_panics(raw in ".{0,40}") {
        let _ = parse_list_cell(&raw);
    }

    #[test]
    fn quoted_names_round_trip_through_list_cells(
        names in prop::collection::vec("[A-Za-z][A-Za-z0-9 ]{0,12}[A-Za-z0-9]", 0..6)
    ) {
        let cell = format!(
            "[{}]",
            names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ")
        );
        prop_assert_eq!(parse_list_cell(&cell), names);
    }
}
