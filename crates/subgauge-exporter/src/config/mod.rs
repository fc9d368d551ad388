//! Exporter config loader (strict parsing).
//!
//! Sources, in order: an optional YAML file named by `SUBGAUGE_CONFIG`, then
//! `XUI_EXPORTER_TARGETS` (comma-separated URLs) which replaces `targets`.

pub mod schema;

use std::fs;

use subgauge_core::error::{Result, SubgaugeError};

pub use schema::{ExporterConfig, ExporterSection};

pub const CONFIG_PATH_ENV: &str = "SUBGAUGE_CONFIG";
pub const TARGETS_ENV: &str = "XUI_EXPORTER_TARGETS";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    load_from_str(&read_file(path)?)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn load() -> Result<ExporterConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.trim().is_empty());
    let targets = std::env::var(TARGETS_ENV).ok().filter(|t| !t.is_empty());
    load_with(path.as_deref(), targets.as_deref())
}

/// Resolve a config from an optional file and an optional targets override.
pub fn load_with(path: Option<&str>, targets_env: Option<&str>) -> Result<ExporterConfig> {
    let mut cfg = match path {
        Some(p) => parse_str(&read_file(p)?)?,
        None => ExporterConfig::default(),
    };

    if let Some(raw) = targets_env {
        let targets = parse_targets(raw);
        if targets.is_empty() {
            return Err(SubgaugeError::Config(format!(
                "{TARGETS_ENV} contains no valid URLs after parsing"
            )));
        }
        cfg.targets = targets;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Split a comma-separated target list, trimming blanks.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

fn read_file(path: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| SubgaugeError::Internal(format!("read config {path} failed: {e}")))
}

fn parse_str(s: &str) -> Result<ExporterConfig> {
    let mut cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| SubgaugeError::Config(format!("invalid yaml: {e}")))?;
    for t in &mut cfg.targets {
        *t = t.trim().to_owned();
    }
    cfg.targets.retain(|t| !t.is_empty());
    Ok(cfg)
}
