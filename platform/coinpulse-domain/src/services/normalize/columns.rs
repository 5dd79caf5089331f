pub const SENTIMENT_ENTITY: &[&str] = &["crypto", "coin", "entity", "entity_name", "currency"];
pub const SENTIMENT_LABEL: &[&str] = &["sentiment", "sentiment_label", "label"];
pub const SENTIMENT_CONFIDENCE: &[&str] = &["sentiment_confidence", "confidence", "score"];
pub const DETECTED_ENTITIES: &[&str] =
    &["detected_cryptos", "detected_entities", "mentioned_cryptos"];
pub const COMMENT_ID: &[&str] = &["comment_id"];

pub const PRICE_ENTITY: &[&str] = &[
    "crypto",
    "coin",
    "entity",
    "entity_name",
    "currency",
    "name",
];
pub const PRICE_VALUE: &[&str] = &["price", "close", "price_usd"];
