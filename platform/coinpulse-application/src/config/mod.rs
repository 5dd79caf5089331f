use coinpulse_domain::repositories::cache::DatasetSpec;
use coinpulse_domain::services::aggregation::Bucket;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MERGE_KEY: &str = "post_id";
pub const DEFAULT_OUT_DIR: &str = "reports";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub cache: CacheConfig,
    pub remote: Option<RemoteConfig>,
    pub datasets: DatasetsConfig,
    pub views: Option<ViewsConfig>,
    pub categories: Option<Vec<CategoryConfig>>,
    pub data_quality: Option<DataQualityConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    pub url_template: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DatasetsConfig {
    pub sentiment: DatasetConfig,
    pub prices: DatasetConfig,
    pub posts: Option<DatasetConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// File name inside the cache dir.
    pub file: String,
    pub token: Option<String>,
    pub token_env: Option<String>,
    /// Join key against the sentiment table (posts only).
    pub merge_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    #[default]
    Inner,
    Left,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ViewsConfig {
    pub top_n: Option<usize>,
    pub confidence_threshold: Option<f64>,
    pub watchlist: Option<Vec<String>>,
    pub bucket: Option<Bucket>,
    pub window_days: Option<u32>,
    pub join: Option<JoinMode>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    pub name: String,
    pub entities: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DataQualityConfig {
    pub max_unmapped_labels: Option<usize>,
    pub max_dropped_rows: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DatasetKind {
    Sentiment,
    Prices,
    Posts,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Sentiment, DatasetKind::Prices, DatasetKind::Posts];

    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Sentiment => "sentiment",
            DatasetKind::Prices => "prices",
            DatasetKind::Posts => "posts",
        }
    }

    /// Env var consulted for the file token when the config names none.
    pub fn default_token_env(self) -> Option<&'static str> {
        match self {
            DatasetKind::Sentiment => Some("MERGED_CRYPTO_CSV_ID"),
            DatasetKind::Prices => Some("CRYPTO_PRICES_CSV_ID"),
            DatasetKind::Posts => None,
        }
    }
}

/// View parameters with defaults applied and ranges checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub top_n: usize,
    pub confidence_threshold: f64,
    pub watchlist: Vec<String>,
    pub bucket: Bucket,
    pub window_days: Option<u32>,
    pub join: JoinMode,
}

impl Config {
    pub fn dataset(&self, kind: DatasetKind) -> Option<&DatasetConfig> {
        match kind {
            DatasetKind::Sentiment => Some(&self.datasets.sentiment),
            DatasetKind::Prices => Some(&self.datasets.prices),
            DatasetKind::Posts => self.datasets.posts.as_ref(),
        }
    }

    /// Cache spec for a configured dataset; the token falls back to the environment.
    pub fn dataset_spec(&self, kind: DatasetKind) -> Option<DatasetSpec> {
        let dataset = self.dataset(kind)?;
        let from_env = dataset
            .token_env
            .as_deref()
            .or_else(|| kind.default_token_env())
            .and_then(|name| std::env::var(name).ok());
        let token = dataset
            .token
            .clone()
            .or(from_env)
            .filter(|t| !t.trim().is_empty());
        Some(DatasetSpec {
            name: kind.name().to_string(),
            token,
            file_name: dataset.file.clone(),
        })
    }

    pub fn merge_key(&self) -> String {
        self.datasets
            .posts
            .as_ref()
            .and_then(|p| p.merge_key.clone())
            .unwrap_or_else(|| DEFAULT_MERGE_KEY.to_string())
    }

    pub fn out_dir(&self) -> String {
        self.report
            .as_ref()
            .and_then(|r| r.out_dir.clone())
            .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string())
    }

    pub fn categories(&self) -> &[CategoryConfig] {
        self.categories.as_deref().unwrap_or(&[])
    }

    pub fn view_settings(&self) -> Result<ViewSettings, String> {
        let views = self.views.as_ref();
        let top_n = views.and_then(|v| v.top_n).unwrap_or(DEFAULT_TOP_N);
        if top_n == 0 {
            return Err("views.top_n must be > 0".to_string());
        }
        let confidence_threshold = views
            .and_then(|v| v.confidence_threshold)
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(format!(
                "views.confidence_threshold must be within [0, 1] (got {confidence_threshold})"
            ));
        }
        let window_days = views.and_then(|v| v.window_days);
        if window_days == Some(0) {
            return Err("views.window_days must be > 0".to_string());
        }
        Ok(ViewSettings {
            top_n,
            confidence_threshold,
            watchlist: views
                .and_then(|v| v.watchlist.clone())
                .unwrap_or_default(),
            bucket: views.and_then(|v| v.bucket).unwrap_or_default(),
            window_days,
            join: views.and_then(|v| v.join).unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache.dir.trim().is_empty() {
            return Err("cache.dir must not be empty".to_string());
        }
        for kind in DatasetKind::ALL {
            if let Some(dataset) = self.dataset(kind) {
                if dataset.file.trim().is_empty() {
                    return Err(format!("datasets.{}.file must not be empty", kind.name()));
                }
            }
        }
        for category in self.categories() {
            if category.entities.is_empty() {
                return Err(format!("category `{}` has no entities", category.name));
            }
        }
        self.view_settings().map(|_| ())
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    config
        .validate()
        .map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok((config, contents))
}
