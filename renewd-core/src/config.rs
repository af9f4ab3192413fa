//! Operator configuration, loaded once at startup from a flat JSON file.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schedule::CronExpr;
use crate::types::Account;

/// Default schedule: daily at 16:00 local time.
const DEFAULT_CRONTAB: &str = "0 16 * * *";

/// Top-level configuration file shape.
///
/// ```json
/// {
///   "accounts": [
///     { "username": "me@example.com", "password": "...", "excluded_domains": ["keep.tk"] }
///   ],
///   "account_interval_seconds": 30,
///   "crontab": "0 16 * * *",
///   "webdriver": { "port": 4444, "headless": true }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Accounts to process, in order.
    pub accounts: Vec<Account>,
    /// Pause between accounts, throttling request rate against the site.
    pub account_interval_seconds: u64,
    /// 5-field cron expression deciding when scheduled passes run.
    #[serde(default = "default_crontab")]
    pub crontab: String,
    /// Browser driver settings.
    #[serde(default)]
    pub webdriver: WebDriverConfig,
}

/// Browser driver settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebDriverConfig {
    /// External driver endpoint. When set, no driver process is spawned.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Driver binary to spawn when no endpoint is configured.
    #[serde(default = "default_chromedriver_path")]
    pub chromedriver_path: String,
    /// Port for the spawned driver.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Run the browser headless.
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            chromedriver_path: default_chromedriver_path(),
            port: default_port(),
            headless: default_headless(),
        }
    }
}

fn default_crontab() -> String {
    DEFAULT_CRONTAB.to_string()
}

fn default_chromedriver_path() -> String {
    "chromedriver".to_string()
}

fn default_port() -> u16 {
    4444
}

fn default_headless() -> bool {
    true
}

impl Config {
    /// Load and validate the configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one account is required".to_string(),
            ));
        }
        for account in &self.accounts {
            if account.username.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "account username must not be empty".to_string(),
                ));
            }
        }
        // Fail at startup rather than on the first tick.
        CronExpr::parse(&self.crontab)?;
        Ok(())
    }
}
