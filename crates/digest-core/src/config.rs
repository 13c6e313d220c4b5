//! Configuration management for hn-digest.
//!
//! Provides TOML-based configuration with environment variable overrides
//! and validation that runs before any network or store I/O.

use crate::error::{ConfigError, ConfigResult};
use crate::types::FilterRule;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "HN_DIGEST_CONFIG";

/// File name looked up in the working directory and the XDG config dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Database drivers the store understands.
pub const SUPPORTED_DRIVERS: [&str; 2] = ["sqlite", "mysql"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the news ranking API
    pub api_base_url: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Retention window for seen records (0 = keep forever)
    pub purge_after_days: u32,
    /// Report items matching no filter instead of items matching one
    pub reverse_filters: bool,
    /// Digest recipient; empty disables the email channel
    pub email_to: String,
    /// Digest email subject
    pub email_subject: String,
    /// Hostnames whose links never enter a digest
    pub blacklist: Vec<String>,
    /// Title filters
    pub filters: Vec<FilterRule>,
    /// Seen-set store settings
    pub database: DatabaseConfig,
    /// Outgoing mail settings
    pub smtp: SmtpConfig,
    /// Chat bot settings
    pub telegram: TelegramConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            request_timeout_secs: 30,
            purge_after_days: 30,
            reverse_filters: false,
            email_to: String::new(),
            email_subject: "HackerNews Digest".to_string(),
            blacklist: Vec::new(),
            filters: Vec::new(),
            database: DatabaseConfig::default(),
            smtp: SmtpConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit file.
    ///
    /// # Errors
    /// Returns error if:
    /// - The file does not exist
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the config path, load it, apply environment overrides and validate.
    ///
    /// `explicit` is the `--config` flag; relative paths are taken from the
    /// current directory.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let path = Self::resolve_path(explicit)?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Work out which file to read.
    ///
    /// Order: `explicit`, then `HN_DIGEST_CONFIG`, then `./config.toml`,
    /// then `~/.config/hn-digest/config.toml` (or platform equivalent).
    pub fn resolve_path(explicit: Option<&Path>) -> ConfigResult<PathBuf> {
        let cwd = std::env::current_dir()?;

        if let Some(path) = explicit {
            return Ok(absolutize(&cwd, path));
        }

        if let Ok(val) = std::env::var(CONFIG_PATH_ENV) {
            if !val.is_empty() {
                return Ok(absolutize(&cwd, Path::new(&val)));
            }
        }

        let local = cwd.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(local);
        }

        Self::config_path()
    }

    /// Get the XDG path of the configuration file.
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "hn-digest", "hn-digest").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Apply overrides from the environment.
    ///
    /// Supports the following variables:
    /// - `HN_DIGEST_DATABASE`: database file or name
    /// - `HN_DIGEST_EMAIL_TO`: digest recipient
    /// - `HN_DIGEST_SMTP_PASSWORD`: SMTP password
    /// - `HN_DIGEST_TELEGRAM_TOKEN`: bot token
    /// - `HN_DIGEST_TELEGRAM_CHAT_ID`: target chat
    /// - `HN_DIGEST_PURGE_AFTER_DAYS`: retention window
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HN_DIGEST_DATABASE") {
            tracing::debug!("Override database.database from env: {}", val);
            self.database.database = val;
        }

        if let Some(val) = lookup("HN_DIGEST_EMAIL_TO") {
            tracing::debug!("Override email_to from env: {}", val);
            self.email_to = val;
        }

        if let Some(val) = lookup("HN_DIGEST_SMTP_PASSWORD") {
            tracing::debug!("Override smtp.password from env");
            self.smtp.password = val;
        }

        if let Some(val) = lookup("HN_DIGEST_TELEGRAM_TOKEN") {
            tracing::debug!("Override telegram.token from env");
            self.telegram.token = val;
        }

        if let Some(val) = lookup("HN_DIGEST_TELEGRAM_CHAT_ID") {
            tracing::debug!("Override telegram.chat_id from env: {}", val);
            self.telegram.chat_id = val;
        }

        if let Some(val) = lookup("HN_DIGEST_PURGE_AFTER_DAYS") {
            if let Ok(days) = val.parse() {
                self.purge_after_days = days;
                tracing::debug!("Override purge_after_days from env: {}", days);
            }
        }
    }

    /// Check the configuration for values that would make a run pointless or unsafe.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::invalid("api_base_url", "must not be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.filters.iter().all(|f| f.sub_patterns().next().is_none()) {
            return Err(ConfigError::invalid(
                "filters",
                "at least one non-empty filter pattern is required",
            ));
        }

        self.database.validate()?;
        self.telegram.validate()?;

        Ok(())
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Seen-set store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite` or `mysql`
    pub driver: String,
    /// SQLite file path (or `:memory:`), or MySQL database name
    pub database: String,
    /// MySQL user
    pub username: String,
    /// MySQL password
    pub password: String,
    /// MySQL `host[:port]`
    pub address: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            database: "./hackernews_db.sqlite".to_string(),
            username: String::new(),
            password: String::new(),
            address: String::new(),
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !SUPPORTED_DRIVERS.contains(&self.driver.as_str()) {
            return Err(ConfigError::invalid(
                "database.driver",
                format!(
                    "unsupported driver '{}', expected one of {:?}",
                    self.driver, SUPPORTED_DRIVERS
                ),
            ));
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::invalid("database.database", "must not be empty"));
        }

        if self.driver == "mysql" && self.address.trim().is_empty() {
            return Err(ConfigError::invalid(
                "database.address",
                "required for the mysql driver",
            ));
        }

        Ok(())
    }
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP relay host; empty skips email delivery
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// Sender address
    pub from: String,
    /// Login user; empty disables authentication
    pub username: String,
    /// Login password
    pub password: String,
    /// Upgrade the connection with STARTTLS
    pub use_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            from: String::new(),
            username: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

/// Chat bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token; empty disables the channel
    pub token: String,
    /// Numeric chat id
    pub chat_id: String,
    /// Bot API base URL
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    /// Whether both token and chat id are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    fn validate(&self) -> ConfigResult<()> {
        match (self.token.is_empty(), self.chat_id.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => Err(ConfigError::invalid(
                "telegram.chat_id",
                "required when telegram.token is set",
            )),
            (true, false) => Err(ConfigError::invalid(
                "telegram.token",
                "required when telegram.chat_id is set",
            )),
            (false, false) => self.chat_id.parse::<i64>().map(|_| ()).map_err(|e| {
                ConfigError::invalid("telegram.chat_id", format!("not a number: {e}"))
            }),
        }
    }
}
