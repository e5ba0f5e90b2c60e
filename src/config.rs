// Runtime configuration
// Connection settings come from a YAML file plus environment overrides; no
// credential is ever compiled in.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "BHARATVERSE_CONFIG";
pub const SNOWFLAKE_TOKEN_ENV: &str = "BHARATVERSE_SNOWFLAKE_TOKEN";
pub const LOG_LEVEL_ENV: &str = "BHARATVERSE_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Missing credential: set {0} or source.token")]
    MissingCredential(&'static str),
    #[error("No database file configured for schema {0}")]
    MissingSchema(String),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
    #[error("Failed to locate platform config directory")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub datasets: DatasetSchemas,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Sqlite(SqliteConfig),
    Snowflake(SnowflakeConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Schema name -> database file
    pub schemas: HashMap<String, PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub account: String,
    /// Overrides the URL derived from `account`
    #[serde(default)]
    pub endpoint: Option<String>,
    pub warehouse: String,
    pub database: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_type: TokenType,
}

impl SnowflakeConfig {
    pub fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    #[default]
    Oauth,
    KeypairJwt,
}

impl TokenType {
    pub fn header_value(&self) -> &'static str {
        match self {
            TokenType::Oauth => "OAUTH",
            TokenType::KeypairJwt => "KEYPAIR_JWT",
        }
    }
}

/// Schema that holds each dataset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetSchemas {
    pub art: String,
    pub tourism: String,
    pub seasonal: String,
}

impl Default for DatasetSchemas {
    fn default() -> Self {
        DatasetSchemas {
            art: "ARTFORM_DATA".to_string(),
            tourism: "TOURISM_DATA".to_string(),
            seasonal: "SEASONAL_DATA".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 2,
            initial_backoff_ms: 250,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from `$BHARATVERSE_CONFIG`, falling back to the platform config
    /// directory, then apply environment overrides and validate.
    pub fn load() -> ConfigResult<Config> {
        let path = config_path()?;
        let mut config = Config::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Config> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        log::debug!("loading config from {}", path.display());
        Config::from_yaml(&contents, base_dir)
    }

    /// Parse YAML, resolving relative database paths against `base_dir`
    pub fn from_yaml(contents: &str, base_dir: &Path) -> ConfigResult<Config> {
        let mut config: Config = serde_yaml::from_str(contents)?;
        if let SourceConfig::Sqlite(sqlite) = &mut config.source {
            for path in sqlite.schemas.values_mut() {
                if path.is_relative() {
                    *path = base_dir.join(&*path);
                }
            }
        }
        Ok(config)
    }

    /// Environment wins over the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let SourceConfig::Snowflake(snowflake) = &mut self.source {
            if let Some(token) = lookup(SNOWFLAKE_TOKEN_ENV) {
                snowflake.token = Some(token);
            }
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.log_level()?;

        match &self.source {
            SourceConfig::Snowflake(snowflake) => {
                let has_token = snowflake
                    .token
                    .as_deref()
                    .is_some_and(|t| !t.trim().is_empty());
                if !has_token {
                    return Err(ConfigError::MissingCredential(SNOWFLAKE_TOKEN_ENV));
                }
            }
            SourceConfig::Sqlite(sqlite) => {
                for schema in [&self.datasets.art, &self.datasets.tourism, &self.datasets.seasonal] {
                    if !sqlite.schemas.contains_key(schema) {
                        return Err(ConfigError::MissingSchema(schema.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn log_level(&self) -> ConfigResult<log::Level> {
        log::Level::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

fn config_path() -> ConfigResult<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join("bharatverse").join("config.yaml"))
}
