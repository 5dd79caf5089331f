use coinpulse_domain::repositories::cache::RemoteFileSource;
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

pub const DEFAULT_URL_TEMPLATE: &str = "https://drive.google.com/uc?export=download&id={token}";
const TOKEN_PLACEHOLDER: &str = "{token}";

/// Downloads token-addressed files over HTTP with a bounded timeout.
///
/// Transport errors and 5xx responses are retried up to `retries` extra
/// attempts; any other non-2xx status or an empty body fails immediately.
pub struct HttpFileSource {
    pub url_template: String,
    pub timeout_ms: u64,
    pub retries: u32,
    client: Client,
}

impl HttpFileSource {
    pub fn new(url_template: String, timeout_ms: u64, retries: u32) -> Result<Self, String> {
        if !url_template.contains(TOKEN_PLACEHOLDER) {
            return Err(format!(
                "url template must contain {TOKEN_PLACEHOLDER}: {url_template}"
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            url_template,
            timeout_ms,
            retries,
            client,
        })
    }

    pub fn url_for(&self, token: &str) -> String {
        self.url_template.replace(TOKEN_PLACEHOLDER, token.trim())
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, String> {
        let mut attempts = 0u32;
        let mut last_error = String::from("no attempt made");

        while attempts <= self.retries {
            attempts += 1;
            if attempts > 1 {
                metrics::counter!("coinpulse.infra.remote.retries_total").increment(1);
                tracing::debug!(attempt = attempts, "retrying download");
            }

            metrics::counter!("coinpulse.infra.remote.requests_total").increment(1);
            let attempt_start = Instant::now();
            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    metrics::histogram!(
                        "coinpulse.infra.remote.attempt_ms",
                        "status" => status.as_u16().to_string()
                    )
                    .record(attempt_start.elapsed().as_millis() as f64);

                    if status.is_success() {
                        let body = resp
                            .bytes()
                            .map_err(|err| format!("failed to read response body: {err}"))?;
                        if body.is_empty() {
                            return Err("remote returned an empty body".to_string());
                        }
                        return Ok(body.to_vec());
                    }

                    last_error = format!("http error: status {}", status.as_u16());
                    if status.is_server_error() {
                        continue;
                    }
                    break;
                }
                Err(err) => {
                    metrics::histogram!("coinpulse.infra.remote.attempt_ms", "status" => "err")
                        .record(attempt_start.elapsed().as_millis() as f64);
                    last_error = format!("request failed: {err}");
                }
            }
        }

        Err(format!("{last_error} (after {attempts} attempts)"))
    }
}

impl RemoteFileSource for HttpFileSource {
    fn download(&self, token: &str, dest: &Path) -> Result<u64, String> {
        let url = self.url_for(token);
        let span = tracing::info_span!(
            "infra.remote.download",
            dest = %dest.display(),
            timeout_ms = self.timeout_ms,
            retries = self.retries
        );
        let _enter = span.enter();

        let start = Instant::now();
        let result = self.fetch_bytes(&url).and_then(|body| {
            fs::write(dest, &body)
                .map_err(|err| format!("failed to write {}: {}", dest.display(), err))?;
            Ok(body.len() as u64)
        });

        let result_label = if result.is_ok() { "ok" } else { "err" };
        metrics::histogram!("coinpulse.infra.remote.download_ms", "result" => result_label)
            .record(start.elapsed().as_millis() as f64);
        result
    }
}
