use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.freecurrencyapi.com/v1/latest";
pub const DEFAULT_API_KEY_ENV: &str = "FXCACHE_API_KEY";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    concat!("fxcache/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefer the environment variable named by `api_key_env` over this field.
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after the first one fails. Zero means a single request.
    #[serde(default)]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Disk,
    Memory,
    Keyspace,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Root directory of the rate cache.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.cache.path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "fxcache", "fxcache")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("rates"))
    }

    /// Resolves the API key, environment first.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.provider.api_key.clone())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
