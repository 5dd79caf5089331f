use crate::value_objects::comment_id::CommentId;
use crate::value_objects::sentiment_label::SentimentLabel;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    pub entity_name: String,
    pub detected_entities: Vec<String>,
    pub observed_at: NaiveDate,
    pub sentiment_label: SentimentLabel,
    pub sentiment_confidence: Option<f64>,
    pub comment_id: CommentId,
}
