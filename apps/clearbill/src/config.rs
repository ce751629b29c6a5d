use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use client_core::transport::DEFAULT_API_BASE_URL;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "clearbill.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 120,
            log_filter: "warn,client_core=info".into(),
        }
    }
}

/// Defaults, then the config file, then environment. An explicitly named
/// config file must exist; the default one is optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)
            .context("invalid clearbill config file")?;
        if let Some(v) = file_cfg.get("api_base_url").and_then(toml_string) {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.get("request_timeout_secs").and_then(toml_string) {
            settings.request_timeout_secs = parse_timeout(&v)?;
        }
        if let Some(v) = file_cfg.get("log_filter").and_then(toml_string) {
            settings.log_filter = v;
        }
    }

    if let Some(v) = env("CLEARBILL_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = parse_timeout(&v)?;
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    Ok(settings)
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');

    if raw.is_empty() {
        return Settings::default().api_base_url;
    }

    if raw.contains("://") {
        return raw.to_string();
    }

    format!("http://{raw}")
}

fn toml_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid request timeout '{raw}'"))?;
    Ok(secs.max(1))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
