use coinpulse_domain::repositories::artifacts::ArtifactWriter;
use coinpulse_domain::services::aggregation::{PricedPoint, TrendPoint};
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

fn record_write_metrics(kind: &'static str, start: Instant, result: &Result<(), String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "coinpulse.infra.artifacts.write.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("coinpulse.infra.artifacts.write_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn write_trend_csv(path: &Path, points: &[TrendPoint]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create trend csv {}: {}", path.display(), err))?;
    wtr.write_record(["date", "bullish", "bearish", "neutral", "total"])
        .map_err(|err| format!("failed to write trend csv header: {}", err))?;
    for point in points {
        wtr.write_record([
            point.date.to_string(),
            point.counts.bullish.to_string(),
            point.counts.bearish.to_string(),
            point.counts.neutral.to_string(),
            point.counts.total().to_string(),
        ])
        .map_err(|err| format!("failed to write trend row: {}", err))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush trend csv: {}", err))
}

fn write_overlay_csv(path: &Path, points: &[PricedPoint]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create overlay csv {}: {}", path.display(), err))?;
    wtr.write_record(["entity", "date", "sentiment", "price"])
        .map_err(|err| format!("failed to write overlay csv header: {}", err))?;
    for point in points {
        wtr.write_record([
            point.entity.clone(),
            point.date.to_string(),
            point.value.to_string(),
            point.price.map(|p| p.to_string()).unwrap_or_default(),
        ])
        .map_err(|err| format!("failed to write overlay row: {}", err))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush overlay csv: {}", err))
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        let start = Instant::now();
        let result = fs::create_dir_all(path)
            .map_err(|err| format!("failed to create dir {}: {}", path.display(), err));
        record_write_metrics("ensure_dir", start, &result);
        result
    }

    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<(), String> {
        let start = Instant::now();
        let result = serde_json::to_string_pretty(value)
            .map_err(|err| format!("failed to serialize json: {err}"))
            .and_then(|json| {
                fs::write(path, json)
                    .map_err(|err| format!("failed to write json {}: {}", path.display(), err))
            });
        record_write_metrics("json", start, &result);
        result
    }

    fn write_trend_csv(&self, path: &Path, points: &[TrendPoint]) -> Result<(), String> {
        let start = Instant::now();
        let result = write_trend_csv(path, points);
        record_write_metrics("trend_csv", start, &result);
        result
    }

    fn write_overlay_csv(&self, path: &Path, points: &[PricedPoint]) -> Result<(), String> {
        let start = Instant::now();
        let result = write_overlay_csv(path, points);
        record_write_metrics("overlay_csv", start, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::FilesystemArtifactWriter;
    use chrono::NaiveDate;
    use coinpulse_domain::repositories::artifacts::ArtifactWriter;
    use coinpulse_domain::services::aggregation::{PricedPoint, TrendPoint};
    use coinpulse_domain::value_objects::label_counts::LabelCounts;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("coinpulse_{name}_{}_{}", std::process::id(), now))
    }

    #[test]
    fn writes_trend_and_overlay_csv() {
        let dir = unique_tmp_path("artifacts");
        let writer = FilesystemArtifactWriter::new();
        writer.ensure_dir(&dir).expect("dir");

        let date = NaiveDate::from_ymd_opt(2024, 11, 1).expect("date");
        let trend = vec![TrendPoint {
            date,
            counts: LabelCounts {
                bullish: 2,
                bearish: 1,
                neutral: 0,
            },
        }];
        writer
            .write_trend_csv(&dir.join("trend.csv"), &trend)
            .expect("trend");
        let overlay = vec![PricedPoint {
            entity: "Solana".to_string(),
            date,
            value: 0.5,
            price: None,
        }];
        writer
            .write_overlay_csv(&dir.join("overlay.csv"), &overlay)
            .expect("overlay");

        let trend_text = fs::read_to_string(dir.join("trend.csv")).expect("read trend");
        assert_eq!(
            trend_text,
            "date,bullish,bearish,neutral,total\n2024-11-01,2,1,0,3\n"
        );
        let overlay_text = fs::read_to_string(dir.join("overlay.csv")).expect("read overlay");
        assert!(overlay_text.ends_with("Solana,2024-11-01,0.5,\n"));
        let _ = fs::remove_dir_all(&dir);
    }
}
