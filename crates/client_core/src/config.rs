use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub endpoint: String,
    pub synapse_endpoint: String,
    pub app_id: String,
    pub request_timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000".into(),
            synapse_endpoint: "http://127.0.0.1:9001".into(),
            app_id: "mobile-toolbox".into(),
            request_timeout_seconds: 30,
        }
    }
}

/// Defaults, then `console.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.get("endpoint") {
            settings.endpoint = v.clone();
        }
        if let Some(v) = file_cfg.get("synapse_endpoint") {
            settings.synapse_endpoint = v.clone();
        }
        if let Some(v) = file_cfg.get("app_id") {
            settings.app_id = v.clone();
        }
        if let Some(v) = file_cfg.get("request_timeout_seconds") {
            settings.request_timeout_seconds = parse_timeout(v)?;
        }
    }

    if let Some(v) = env("STUDY_CONSOLE_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = env("APP__ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = env("APP__SYNAPSE_ENDPOINT") {
        settings.synapse_endpoint = v;
    }
    if let Some(v) = env("APP__APP_ID") {
        settings.app_id = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        settings.request_timeout_seconds = parse_timeout(&v)?;
    }

    settings.endpoint = normalize_base_url(&settings.endpoint)?;
    settings.synapse_endpoint = normalize_base_url(&settings.synapse_endpoint)?;
    Ok(settings)
}

fn parse_timeout(raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("invalid request_timeout_seconds '{raw}'"))
}

/// Base urls are joined with absolute paths, so any trailing slash goes.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("unsupported scheme '{}' in base url '{raw}'", parsed.scheme());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
