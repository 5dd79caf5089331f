use crate::errors::DatasetError;
use crate::services::normalize::NormalizationReport;
use crate::value_objects::price_point::PricePoint;
use crate::value_objects::sentiment_record::SentimentRecord;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MergeSource {
    pub path: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct DatasetQuery {
    pub name: String,
    pub path: PathBuf,
    pub merge: Option<MergeSource>,
}

pub trait SentimentRepository {
    fn load_sentiment(
        &self,
        query: &DatasetQuery,
    ) -> Result<(Vec<SentimentRecord>, NormalizationReport), DatasetError>;
}

pub trait PriceRepository {
    fn load_prices(
        &self,
        query: &DatasetQuery,
    ) -> Result<(Vec<PricePoint>, NormalizationReport), DatasetError>;
}
