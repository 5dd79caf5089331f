use coinpulse_application::config::Config;
use coinpulse_application::dashboard::DatasetSelection;
use coinpulse_infrastructure::artifacts::FilesystemArtifactWriter;
use coinpulse_infrastructure::datasets::FilesystemDatasetRepository;
use coinpulse_infrastructure::remote::{HttpFileSource, DEFAULT_URL_TEMPLATE};
use coinpulse_infrastructure::storage::FilesystemDatasetCache;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessMode {
    Dashboard,
    Refresh,
    Validate,
    Export,
}

impl HeadlessMode {
    fn as_str(self) -> &'static str {
        match self {
            HeadlessMode::Dashboard => "dashboard",
            HeadlessMode::Refresh => "refresh",
            HeadlessMode::Validate => "validate",
            HeadlessMode::Export => "export",
        }
    }
}

pub struct HeadlessArgs {
    pub mode: HeadlessMode,
    pub config_path: PathBuf,
    pub dataset: String,
    pub strict: bool,
    pub out_dir: Option<PathBuf>,
}

pub fn run_headless(args: HeadlessArgs) -> Result<serde_json::Value, String> {
    let (config, _config_toml) =
        coinpulse_application::config::load_config_with_source(&args.config_path)?;
    let start = Instant::now();
    let result = match args.mode {
        HeadlessMode::Dashboard => run_dashboard(&config),
        HeadlessMode::Refresh => run_refresh(&config, &args.dataset),
        HeadlessMode::Validate => run_validate(&config, args.strict),
        HeadlessMode::Export => run_export(&config, args.out_dir.as_deref()),
    };
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::histogram!(
        "coinpulse.cli.mode_ms",
        "mode" => args.mode.as_str(),
        "result" => result_label
    )
    .record(start.elapsed().as_millis() as f64);
    result
}

fn build_cache(config: &Config) -> Result<FilesystemDatasetCache<HttpFileSource>, String> {
    let remote = config.remote.as_ref();
    let url_template = remote
        .and_then(|r| r.url_template.clone())
        .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string());
    let source = HttpFileSource::new(
        url_template,
        remote.and_then(|r| r.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS),
        remote.and_then(|r| r.retries).unwrap_or(DEFAULT_RETRIES),
    )
    .map_err(|err| format!("failed to init remote file source: {err}"))?;
    Ok(FilesystemDatasetCache::new(&config.cache.dir, source))
}

fn run_dashboard(config: &Config) -> Result<serde_json::Value, String> {
    let cache = build_cache(config)?;
    let repo = FilesystemDatasetRepository::new();
    let report =
        coinpulse_application::dashboard::build_dashboard(config, &cache, &repo, &repo)?;
    Ok(serde_json::json!({
        "status": "ok",
        "mode": "dashboard",
        "cache_dir": config.cache.dir,
        "dashboard": report,
    }))
}

fn run_refresh(config: &Config, dataset: &str) -> Result<serde_json::Value, String> {
    let selection = DatasetSelection::parse(dataset)?;
    let cache = build_cache(config)?;
    let repo = FilesystemDatasetRepository::new();
    let report =
        coinpulse_application::dashboard::refresh(config, &cache, &repo, &repo, selection)?;
    Ok(serde_json::json!({
        "status": "ok",
        "mode": "refresh",
        "dataset": dataset,
        "invalidated": report.invalidated,
        "dashboard": report.dashboard,
    }))
}

fn run_validate(config: &Config, strict: bool) -> Result<serde_json::Value, String> {
    let cache = build_cache(config)?;
    let repo = FilesystemDatasetRepository::new();
    let report =
        coinpulse_application::validation::validate(config, strict, &cache, &repo, &repo)?;
    Ok(serde_json::json!({
        "status": "ok",
        "mode": "validate",
        "strict": strict,
        "report": report,
    }))
}

fn run_export(config: &Config, out_dir: Option<&Path>) -> Result<serde_json::Value, String> {
    let cache = build_cache(config)?;
    let repo = FilesystemDatasetRepository::new();
    let out_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config.out_dir()));
    let report =
        coinpulse_application::dashboard::build_dashboard(config, &cache, &repo, &repo)?;
    let writer = FilesystemArtifactWriter::new();
    let artifacts = coinpulse_application::exports::export_dashboard(&report, &out_dir, &writer)?;
    Ok(serde_json::json!({
        "status": "ok",
        "mode": "export",
        "artifacts": artifacts,
    }))
}
