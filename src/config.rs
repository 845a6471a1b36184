use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::*;
use crate::error::{Result, ScraperError};
use crate::types::ItemPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub enrichment: EnrichmentConfig,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub venue_url_base: String,
    pub user_agent: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            venue_url_base: DEFAULT_VENUE_URL_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SourceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub days: u32,
    pub concurrency: usize,
    pub item_policy: ItemPolicy,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_ENRICHMENT_DAYS,
            concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            item_policy: ItemPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub port: Option<u16>,
}

impl Config {
    /// Loads `config.toml` (or `$SHOWTIMES_CONFIG`) if present, then applies
    /// environment overrides. A missing file means built-in defaults.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var("SHOWTIMES_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WEB_SCRAPING_URL").filter(|v| !v.trim().is_empty()) {
            self.source.base_url = url.trim().to_string();
        }
        if let Some(path) = lookup("SHOWTIMES_DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.store.path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("SHOWTIMES_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.logging.dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("SHOWTIMES_PORT") {
            self.server.port = parse_port("SHOWTIMES_PORT", &port)?;
        }
        if let Some(port) = lookup("SHOWTIMES_METRICS_PORT") {
            self.metrics.port = Some(parse_port("SHOWTIMES_METRICS_PORT", &port)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("source.base_url", &self.source.base_url),
            ("source.venue_url_base", &self.source.venue_url_base),
        ] {
            let parsed = reqwest::Url::parse(value)
                .map_err(|e| ScraperError::Config(format!("{field} '{value}' is not a URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ScraperError::Config(format!(
                    "{field} must be http(s), got '{}'",
                    parsed.scheme()
                )));
            }
        }
        if !(1..=MAX_ENRICHMENT_DAYS).contains(&self.enrichment.days) {
            return Err(ScraperError::Config(format!(
                "enrichment.days must be between 1 and {MAX_ENRICHMENT_DAYS}, got {}",
                self.enrichment.days
            )));
        }
        if self.enrichment.concurrency == 0 {
            return Err(ScraperError::Config(
                "enrichment.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_port(name: &str, raw: &str) -> Result<u16> {
    raw.trim()
        .parse()
        .map_err(|_| ScraperError::Config(format!("{name} must be a port number, got '{raw}'")))
}
