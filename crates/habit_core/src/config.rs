//! Runtime configuration.
//!
//! # Responsibility
//! - Load TOML configuration with per-field defaults.
//! - Apply environment overrides for deployment-specific values.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - Every section tolerates missing keys (`#[serde(default)]`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "HABIT_DB_PATH";
pub const ENV_BIND: &str = "HABIT_BIND";
pub const ENV_API_URL: &str = "HABIT_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub quotes: QuoteConfig,
    pub logging: LoggingConfig,
    pub client: ClientConfig,
}

/// HTTP backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind: String,
    /// Browser origins allowed to call the API.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            allowed_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_data_dir().join("habit.sqlite3"),
        }
    }
}

/// Remote quote source and translator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub source_base_url: String,
    pub translator_base_url: String,
    pub translator_model: String,
    /// Name of the environment variable holding the translator API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            source_base_url: "https://dummyjson.com".to_string(),
            translator_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            translator_model: "gemini-1.5-flash-latest".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; stderr only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
        }
    }
}

impl HabitConfig {
    /// Loads configuration from a TOML file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path`, or defaults when the file does not exist, then applies
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `HABIT_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = lookup(ENV_DB_PATH) {
            self.storage.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_BIND) {
            self.server.bind = value;
        }
        if let Some(value) = lookup(ENV_API_URL) {
            self.client.api_url = value;
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns the default config file path: `~/.config/habit/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("habit").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("habit")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/habit-config/config.toml")
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(data) = std::env::var_os("XDG_DATA_HOME") {
        PathBuf::from(data).join("habit")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share").join("habit")
    } else {
        PathBuf::from("/tmp/habit-data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_local_development_setup() {
        let config = HabitConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert!(config
            .server
            .allowed_origins
            .contains(&"http://localhost:5173".to_string()));
        assert_eq!(config.client.api_url, "http://localhost:8000");
        assert_eq!(config.quotes.api_key_env, "GEMINI_API_KEY");
        assert!(config.storage.db_path.ends_with("habit.sqlite3"));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();

        let config = HabitConfig::from_file(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.allowed_origins.len(), 3);
        assert_eq!(config.quotes, QuoteConfig::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = HabitConfig::default();
        config.logging.dir = Some(PathBuf::from("/var/log/habit"));
        let text = config.to_toml().unwrap();
        let loaded: HabitConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HabitConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "server = [").unwrap();
        let err = HabitConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn env_overrides_replace_values_and_ignore_blanks() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, "/data/habit.db"),
            (ENV_BIND, "0.0.0.0:8080"),
            (ENV_API_URL, "  "),
        ]);
        let mut config = HabitConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.storage.db_path, PathBuf::from("/data/habit.db"));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.client.api_url, "http://localhost:8000");
    }
}
