use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use subgauge_core::error::{Result, SubgaugeError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    #[serde(default)]
    pub targets: Vec<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            targets: Vec::new(),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SubgaugeError::UnsupportedVersion);
        }
        if self.targets.is_empty() {
            return Err(SubgaugeError::Config(
                "targets must not be empty (set targets or XUI_EXPORTER_TARGETS)".into(),
            ));
        }
        for t in &self.targets {
            validate_target(t)?;
        }

        self.exporter.validate()
    }
}

fn validate_target(target: &str) -> Result<()> {
    let url = reqwest::Url::parse(target)
        .map_err(|e| SubgaugeError::Config(format!("target {target:?} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SubgaugeError::Config(format!(
            "target {target:?} has unsupported scheme {other:?}"
        ))),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
            refresh_interval_ms: default_refresh_interval_ms(),
            fetch_concurrency: default_fetch_concurrency(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.metrics_path.starts_with('/') || self.metrics_path.len() < 2 {
            return Err(SubgaugeError::Config(
                "exporter.metrics_path must start with '/' and name a path".into(),
            ));
        }
        if self.metrics_path.contains(['*', ':', '{', '}']) {
            return Err(SubgaugeError::Config(
                "exporter.metrics_path must be a literal path (no '*', ':', '{' or '}')".into(),
            ));
        }
        if matches!(self.metrics_path.as_str(), "/healthz" | "/readyz") {
            return Err(SubgaugeError::Config(
                "exporter.metrics_path collides with a built-in route".into(),
            ));
        }
        if !(1_000..=86_400_000).contains(&self.refresh_interval_ms) {
            return Err(SubgaugeError::Config(
                "exporter.refresh_interval_ms must be between 1000 and 86400000".into(),
            ));
        }
        if !(1..=64).contains(&self.fetch_concurrency) {
            return Err(SubgaugeError::Config(
                "exporter.fetch_concurrency must be between 1 and 64".into(),
            ));
        }
        if !(100..=300_000).contains(&self.fetch_timeout_ms) {
            return Err(SubgaugeError::Config(
                "exporter.fetch_timeout_ms must be between 100 and 300000".into(),
            ));
        }
        if self.fetch_timeout_ms >= self.refresh_interval_ms {
            return Err(SubgaugeError::Config(
                "exporter.fetch_timeout_ms must be less than refresh_interval_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            SubgaugeError::Config(format!("exporter.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:9100".into()
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_refresh_interval_ms() -> u64 {
    60_000
}
fn default_fetch_concurrency() -> usize {
    4
}
fn default_fetch_timeout_ms() -> u64 {
    15_000
}
