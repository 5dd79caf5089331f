use crate::services::aggregation::{PricedPoint, TrendPoint};
use std::path::Path;

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String>;
    fn write_trend_csv(&self, path: &Path, points: &[TrendPoint]) -> Result<(), String>;
    fn write_overlay_csv(&self, path: &Path, points: &[PricedPoint]) -> Result<(), String>;
}
