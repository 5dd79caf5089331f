use clap::{Parser, ValueEnum};
use coinpulse::headless::{HeadlessArgs, HeadlessMode};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coinpulse")]
#[command(about = "Crypto sentiment dashboard pipeline: fetch, normalize, aggregate, export.", version)]
struct Cli {
    /// Mode: dashboard | refresh | validate | export
    #[arg(long, value_enum, default_value_t = Mode::Dashboard)]
    mode: Mode,

    /// Config file path (TOML). If omitted, uses env COINPULSE_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset to discard before rebuilding (refresh mode only).
    #[arg(long, default_value = "all")]
    dataset: String,

    /// Enable strict data-quality limits (validate mode only).
    #[arg(long)]
    strict: bool,

    /// Output directory; overrides [report].out_dir (export mode only).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Dashboard,
    Refresh,
    Validate,
    Export,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let mode = match cli.mode {
        Mode::Dashboard => HeadlessMode::Dashboard,
        Mode::Refresh => HeadlessMode::Refresh,
        Mode::Validate => HeadlessMode::Validate,
        Mode::Export => HeadlessMode::Export,
    };

    let config_path = cli
        .config
        .or_else(|| {
            std::env::var("COINPULSE_CONFIG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| {
            eprintln!("error: missing --config and env COINPULSE_CONFIG is not set");
            std::process::exit(1);
        });

    let result = coinpulse::headless::run_headless(HeadlessArgs {
        mode,
        config_path,
        dataset: cli.dataset,
        strict: cli.strict,
        out_dir: cli.out,
    });

    match result {
        Ok(json) => {
            println!(
                "{}",
                serde_json::to_string(&json)
                    .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
            );
            std::process::exit(0);
        }
        Err(err) => {
            let lower = err.to_lowercase();
            let code = if lower.contains("strict validation failed") {
                2
            } else {
                1
            };
            eprintln!("error: {err}");
            std::process::exit(code);
        }
    }
}

fn init_tracing() -> Result<(), String> {
    let filter = std::env::var("COINPULSE_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let format = std::env::var("COINPULSE_LOG_FORMAT")
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    // stdout carries the JSON result; logs go to stderr
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("COINPULSE_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid COINPULSE_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    if std::env::var("COINPULSE_METRICS_ADDR").is_ok_and(|v| !v.trim().is_empty()) {
        return Err("COINPULSE_METRICS_ADDR requires the `prometheus` feature".to_string());
    }
    Ok(None)
}
