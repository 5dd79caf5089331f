use coinpulse_application::config::Config;
use coinpulse_application::dashboard::{build_dashboard, refresh, DatasetSelection, ViewData};
use coinpulse_application::exports::export_dashboard;
use coinpulse_domain::repositories::cache::RemoteFileSource;
use coinpulse_infrastructure::artifacts::FilesystemArtifactWriter;
use coinpulse_infrastructure::datasets::FilesystemDatasetRepository;
use coinpulse_infrastructure::storage::FilesystemDatasetCache;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_tmp_path(name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("coinpulse_{name}_{}_{}", std::process::id(), now))
}

/// Serves fixture files keyed by token.
struct FixtureSource {
    files: HashMap<String, String>,
    downloads: Cell<u32>,
}

impl RemoteFileSource for FixtureSource {
    fn download(&self, token: &str, dest: &Path) -> Result<u64, String> {
        self.downloads.set(self.downloads.get() + 1);
        let body = self
            .files
            .get(token)
            .ok_or_else(|| format!("unknown token {token}"))?;
        fs::write(dest, body).map_err(|err| err.to_string())?;
        Ok(body.len() as u64)
    }
}

const SENTIMENT: &str = "\u{feff}date|crypto|sentiment|sentiment_confidence|detected_cryptos|comment_id\n\
2024-12-01 09:15:00|Bitcoin|bullish|0.92|['Bitcoin']|c1\n\
2024-12-01 10:00:00|Solana|positive|0.81|['Solana', 'Bitcoin']|c2\n\
2024-12-02|Ethereum|negative|0.75|[]|NaN\n\
2024-12-02|Dogecoin|moon|0.30|not a list|c4\n\
2024-12-02|Bitcoin|bearish\n";

const PRICES: &str = "date | crypto | price \n\
2024-12-01|bitcoin|96500.0\n\
2024-12-02|Ethereum|3600.5\n";

fn config(cache_dir: &Path) -> Config {
    let toml_str = format!(
        r#"
[cache]
dir = "{}"

[datasets.sentiment]
file = "merged_crypto.csv"
token = "sentiment-token"

[datasets.prices]
file = "crypto_prices.csv"
token = "prices-token"

[views]
watchlist = ["Bitcoin", "Cardano"]
"#,
        cache_dir.display()
    );
    toml::from_str(&toml_str).expect("config should parse")
}

fn source() -> FixtureSource {
    FixtureSource {
        files: HashMap::from([
            ("sentiment-token".to_string(), SENTIMENT.to_string()),
            ("prices-token".to_string(), PRICES.to_string()),
        ]),
        downloads: Cell::new(0),
    }
}

#[test]
fn downloads_normalizes_aggregates_and_exports() {
    let root = unique_tmp_path("pipeline");
    let config = config(&root.join("cache"));
    let cache = FilesystemDatasetCache::new(&config.cache.dir, source());
    let repo = FilesystemDatasetRepository::new();

    let report = build_dashboard(&config, &cache, &repo, &repo).expect("dashboard");
    assert!(report.datasets.values().all(|o| o.is_loaded()));

    let dist = report.views.sentiment_distribution.data().expect("distribution");
    assert_eq!(dist["Solana"].bullish, 1);
    assert_eq!(dist["Ethereum"].bearish, 1);
    assert_eq!(dist["Dogecoin"].neutral, 1);
    assert_eq!(dist["Bitcoin"].total(), 1);

    let series = report.views.word_counts.data().expect("word counts");
    assert_eq!(series[0].total(), 2);
    assert_eq!(series[1].total(), 0);
    assert_eq!(series[1].points.len(), 2);

    let overlay = report.views.price_overlay.data().expect("overlay");
    let keys: Vec<(&str, String)> = overlay
        .iter()
        .map(|p| (p.entity.as_str(), p.date.to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("Bitcoin", "2024-12-01".to_string()),
            ("Ethereum", "2024-12-02".to_string())
        ]
    );

    let out_dir = root.join("out");
    let writer = FilesystemArtifactWriter::new();
    let artifacts = export_dashboard(&report, &out_dir, &writer).expect("export");
    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&artifacts.dashboard_json).expect("read dashboard"),
    )
    .expect("valid json");
    assert_eq!(json["datasets"]["sentiment"]["report"]["unmapped_labels"], 1);
    assert_eq!(json["datasets"]["sentiment"]["report"]["skipped_malformed_rows"], 1);
    let trend = fs::read_to_string(&artifacts.sentiment_trend_csv).expect("read trend");
    assert_eq!(trend.lines().count(), 3);
    assert!(artifacts.price_overlay_csv.exists());

    assert_eq!(cache.dir(), Path::new(&config.cache.dir));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn cached_snapshot_is_reused_until_refresh() {
    let root = unique_tmp_path("pipeline_refresh");
    let config = config(&root.join("cache"));
    let src = source();
    let cache = FilesystemDatasetCache::new(&config.cache.dir, src);
    let repo = FilesystemDatasetRepository::new();

    build_dashboard(&config, &cache, &repo, &repo).expect("first build");
    build_dashboard(&config, &cache, &repo, &repo).expect("second build");

    let report = refresh(&config, &cache, &repo, &repo, DatasetSelection::All).expect("refresh");
    assert!(report.invalidated.iter().all(|i| i.removed));
    assert!(report.dashboard.views.top_mentioned.is_ready());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn zero_row_files_render_no_data() {
    let root = unique_tmp_path("pipeline_empty");
    let config = config(&root.join("cache"));
    let src = FixtureSource {
        files: HashMap::from([
            (
                "sentiment-token".to_string(),
                "date|crypto|sentiment\n".to_string(),
            ),
            ("prices-token".to_string(), "date|crypto|price\n".to_string()),
        ]),
        downloads: Cell::new(0),
    };
    let cache = FilesystemDatasetCache::new(&config.cache.dir, src);
    let repo = FilesystemDatasetRepository::new();

    let report = build_dashboard(&config, &cache, &repo, &repo).expect("dashboard");
    assert_eq!(report.views.top_mentioned, ViewData::NoData);
    assert_eq!(report.views.sentiment_trend, ViewData::NoData);
    assert_eq!(report.views.price_overlay, ViewData::NoData);
    assert_eq!(report.views.latest_prices, ViewData::NoData);
    let _ = fs::remove_dir_all(&root);
}
