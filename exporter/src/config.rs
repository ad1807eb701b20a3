use crate::errors::Result;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "settings.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub nest: NestConfig,
    pub owm: OwmConfig,
    #[serde(default)]
    pub exporter: ExporterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestConfig {
    pub client_id: String,
    pub client_secret: String,
    pub access_token_cache_file: String,
    #[serde(default = "default_nest_api_url")]
    pub api_url: String,
    #[serde(default = "default_nest_token_url")]
    pub token_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmConfig {
    pub owm_id: String,
    pub owm_city_id: u64,
    #[serde(default = "default_owm_api_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_nest_api_url() -> String {
    "https://developer-api.nest.com".to_string()
}

fn default_nest_token_url() -> String {
    "https://api.home.nest.com/oauth2/access_token".to_string()
}

fn default_owm_api_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

/// Loads settings from a TOML file. Missing or malformed config is fatal
/// to startup, so errors propagate to the caller.
pub fn load(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}
