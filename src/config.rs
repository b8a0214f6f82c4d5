use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const DEFAULT_ADDR: &str = "0.0.0.0:3146";
const DEFAULT_DATA_DIR: &str = "data";

/// Credentials and timing for the TMDB transports.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub access_token: String,
    pub base_url: String,
    pub language: String,
    /// Upper bound for a single transport attempt.
    pub request_timeout: Duration,
    /// Pause before the last no-credential retry.
    pub retry_backoff: Duration,
}

impl TmdbConfig {
    pub fn new(api_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            access_token: access_token.into(),
            base_url: TMDB_BASE.to_string(),
            language: "en-US".to_string(),
            request_timeout: Duration::from_secs(20),
            retry_backoff: Duration::from_millis(1500),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = required("TMDB_API_KEY")?;
        let access_token = required("TMDB_ACCESS_TOKEN")?;
        let mut config = Self::new(api_key, access_token);
        if let Some(base) = optional("TMDB_BASE_URL") {
            config = config.with_base_url(base);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tmdb: TmdbConfig,
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let tmdb = TmdbConfig::from_env()?;
        let addr = optional("CINEFLOW_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .context("CINEFLOW_ADDR is not a valid socket address")?;
        let data_dir = optional("CINEFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Ok(Self {
            tmdb,
            addr,
            data_dir,
        })
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow::anyhow!("Missing required environment variable: {}", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
