use crate::value_objects::sentiment_label::SentimentLabel;
use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

impl LabelCounts {
    pub fn increment(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Bullish => self.bullish += 1,
            SentimentLabel::Bearish => self.bearish += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Bullish => self.bullish,
            SentimentLabel::Bearish => self.bearish,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.bullish + self.bearish + self.neutral
    }
}
