use serde::Serialize;

/// A per-entity statistic that may not be computable from the observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStat {
    Value(f64),
    InsufficientData,
}

impl ScoreStat {
    pub fn value(self) -> Option<f64> {
        match self {
            ScoreStat::Value(v) => Some(v),
            ScoreStat::InsufficientData => None,
        }
    }
}
