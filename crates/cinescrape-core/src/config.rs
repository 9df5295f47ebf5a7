//! Configuration management for Cinescrape.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/cinescrape/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing query and request cadence
    pub scraping: ScrapingConfig,
    /// Headless browser settings
    pub browser: BrowserConfig,
    /// Retry policy around render calls
    pub retry: RetryConfig,
    /// Detail cache bounds
    pub cache: CacheConfig,
    /// Database and output locations
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if it doesn't exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `CINESCRAPE_DB_PATH`: Override the database file location
    /// - `CINESCRAPE_HEADLESS`: Override browser headless mode (true/false)
    /// - `CINESCRAPE_REQUEST_INTERVAL_MS`: Override the minimum request interval
    pub fn load_with_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CINESCRAPE_DB_PATH") {
            if !val.is_empty() {
                tracing::debug!("Override storage.database_path from env: {}", val);
                self.storage.database_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("CINESCRAPE_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("CINESCRAPE_REQUEST_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.scraping.request_interval_ms = ms;
                tracing::debug!("Override scraping.request_interval_ms from env: {}", ms);
            }
        }
    }

    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scraping.items_per_page == 0 {
            return Err(invalid("scraping.items_per_page", "must be greater than zero"));
        }
        if url::Url::parse(&self.scraping.base_url).is_err() {
            return Err(invalid("scraping.base_url", "must be an absolute URL"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(invalid("browser.viewport", "dimensions must be non-zero"));
        }
        Ok(())
    }

    /// Save configuration to the default location.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/cinescrape/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/cinescrape`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Resolved database file path.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("movies.db")),
        }
    }

    /// Resolved directory for JSON/CSV output files.
    pub fn output_dir(&self) -> ConfigResult<PathBuf> {
        match &self.storage.output_dir {
            Some(path) => Ok(path.clone()),
            None => Self::data_dir(),
        }
    }

    /// Resolved error log file path.
    pub fn error_log_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.error_log {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("scraper.log")),
        }
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "cinescrape", "cinescrape").ok_or(ConfigError::NoConfigDir)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Listing query settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Site origin used to absolutize item links
    pub base_url: String,
    /// Path of the search listing
    pub search_path: String,
    /// Items requested per unit of page budget
    pub items_per_page: u32,
    /// `title_type` query filter
    pub title_type: String,
    /// `sort` query parameter
    pub sort: String,
    /// Minimum interval between render requests in milliseconds
    pub request_interval_ms: u64,
}

impl ScrapingConfig {
    /// Minimum interval between render requests.
    #[must_use]
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.imdb.com".to_string(),
            search_path: "/search/title/".to_string(),
            items_per_page: 50,
            title_type: "feature".to_string(),
            sort: "user_rating,desc".to_string(),
            request_interval_ms: 2000,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Wait after navigation before the document is captured
    pub settle_delay_ms: u64,
    /// User agent presented by the browser
    pub user_agent: String,
    /// Extra headers sent with every request
    pub extra_headers: BTreeMap<String, String>,
    /// When set, the rendered listing page is written here
    pub debug_dump_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let extra_headers = [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Referer", "https://www.imdb.com/search/title/"),
            ("DNT", "1"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            navigation_timeout_secs: 30,
            settle_delay_ms: 2000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36".to_string(),
            extra_headers,
            debug_dump_path: None,
        }
    }
}

/// Retry policy for render calls. One attempt means no retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per render, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds
    pub base_delay_ms: u64,
    /// Growth factor applied to the delay after each failed attempt
    pub backoff_multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 2000,
            backoff_multiplier: 2,
        }
    }
}

/// Detail cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached detail entries; unbounded when absent
    pub max_entries: Option<usize>,
}

/// Database and output file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `SQLite` database file
    pub database_path: Option<PathBuf>,
    /// Directory receiving `movies.json` / `movies.csv`
    pub output_dir: Option<PathBuf>,
    /// File receiving error-level log lines
    pub error_log: Option<PathBuf>,
}
