use crate::dashboard::DashboardReport;
use coinpulse_domain::repositories::artifacts::ArtifactWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info_span;

pub const DASHBOARD_JSON: &str = "dashboard.json";
pub const TREND_CSV: &str = "sentiment_trend.csv";
pub const OVERLAY_CSV: &str = "price_overlay.csv";

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExportedArtifacts {
    pub out_dir: PathBuf,
    pub dashboard_json: PathBuf,
    pub sentiment_trend_csv: PathBuf,
    pub price_overlay_csv: PathBuf,
}

/// Writes the dashboard document plus the two chart series as flat files.
/// Views that are not ready export as header-only CSVs.
pub fn export_dashboard(
    report: &DashboardReport,
    out_dir: &Path,
    writer: &dyn ArtifactWriter,
) -> Result<ExportedArtifacts, String> {
    let _span = info_span!("export", out_dir = %out_dir.display()).entered();
    let start = Instant::now();

    writer.ensure_dir(out_dir)?;
    let artifacts = ExportedArtifacts {
        out_dir: out_dir.to_path_buf(),
        dashboard_json: out_dir.join(DASHBOARD_JSON),
        sentiment_trend_csv: out_dir.join(TREND_CSV),
        price_overlay_csv: out_dir.join(OVERLAY_CSV),
    };

    let json = serde_json::to_value(report)
        .map_err(|err| format!("failed to serialize dashboard: {err}"))?;
    writer.write_json(&artifacts.dashboard_json, &json)?;

    let trend = report
        .views
        .sentiment_trend
        .data()
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    writer.write_trend_csv(&artifacts.sentiment_trend_csv, trend)?;

    let overlay = report
        .views
        .price_overlay
        .data()
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    writer.write_overlay_csv(&artifacts.price_overlay_csv, overlay)?;

    metrics::histogram!("coinpulse.export.ms").record(start.elapsed().as_millis() as f64);
    tracing::info!(
        trend_rows = trend.len(),
        overlay_rows = overlay.len(),
        "dashboard exported"
    );
    Ok(artifacts)
}
