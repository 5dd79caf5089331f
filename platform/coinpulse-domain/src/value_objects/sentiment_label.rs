use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Bullish,
        SentimentLabel::Bearish,
        SentimentLabel::Neutral,
    ];

    /// Maps either vocabulary (bullish/bearish/neutral or positive/negative/neutral).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bullish" | "positive" => Some(SentimentLabel::Bullish),
            "bearish" | "negative" => Some(SentimentLabel::Bearish),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    pub fn score(self) -> i8 {
        match self {
            SentimentLabel::Bullish => 1,
            SentimentLabel::Neutral => 0,
            SentimentLabel::Bearish => -1,
        }
    }

    pub fn is_directional(self) -> bool {
        !matches!(self, SentimentLabel::Neutral)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Bullish => "bullish",
            SentimentLabel::Bearish => "bearish",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
