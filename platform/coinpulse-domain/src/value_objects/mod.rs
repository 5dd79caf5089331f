pub mod comment_id;
pub mod label_counts;
pub mod price_point;
pub mod raw_table;
pub mod score_stat;
pub mod sentiment_label;
pub mod sentiment_record;
