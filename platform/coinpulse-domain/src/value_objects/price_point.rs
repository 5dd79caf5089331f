use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub entity_name: String,
    pub observed_at: NaiveDate,
    pub price: f64,
}
