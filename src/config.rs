use crate::constants::{API_KEY_ENV, API_KEY_SIGNUP_URL, DEFAULT_BASE_URL};
use crate::error::{CongressError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub votes: VotesConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Pause between consecutive requests.
    pub rate_limit_delay_ms: u64,
    pub timeout_seconds: u64,
    /// Page size for the member listing (the API caps this at 250).
    pub limit_per_page: u32,
    pub max_members: Option<usize>,
    pub sort: String,
    pub congress: Option<u32>,
    /// "house" or "senate"; both chambers when unset.
    pub chamber: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_delay_ms: 200,
            timeout_seconds: 30,
            limit_per_page: 250,
            max_members: None,
            sort: "lastNameAsc".to_string(),
            congress: None,
            chamber: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VotesConfig {
    pub congress: u32,
    pub session: u32,
    /// Roll calls are requested from 1 up to (excluding) this number.
    pub max_records: u32,
}

impl Default for VotesConfig {
    fn default() -> Self {
        Self {
            congress: 119,
            session: 1,
            max_records: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub cards_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            cards_dir: PathBuf::from("cards"),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            CongressError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

/// Reads the Congress.gov API key, loading `.env` first if present.
pub fn api_key_from_env() -> Result<String> {
    dotenv::dotenv().ok();
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(CongressError::Config(format!(
            "{API_KEY_ENV} environment variable not set. Get an API key from {API_KEY_SIGNUP_URL} and set it."
        ))),
    }
}
