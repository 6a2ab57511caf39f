use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

use crate::data::DEFAULT_CATALOG_PATH;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub const ENV_CONFIG_FILE: &str = "VILLAGER_ODDS_CONFIG";
pub const ENV_BIND: &str = "VILLAGER_ODDS_BIND";
pub const ENV_CATALOG: &str = "VILLAGER_ODDS_CATALOG";
pub const ENV_LOG: &str = "VILLAGER_ODDS_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    pub catalog_path: PathBuf,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            log_level: Level::INFO,
        }
    }
}

/// Optional YAML overrides. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub catalog: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            source,
            path: path.to_path_buf(),
        })
    }
}

impl Config {
    /// Defaults, then the file named by `VILLAGER_ODDS_CONFIG`, then the
    /// individual environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let file = match env(ENV_CONFIG_FILE).filter(|path| !path.trim().is_empty()) {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };

        let mut config = Self::default();
        let mut log_level = None;

        if let Some(bind) = file.bind {
            config.bind = bind;
        }
        if let Some(catalog) = file.catalog {
            config.catalog_path = catalog;
        }
        if let Some(level) = file.log_level {
            log_level = Some(level);
        }

        if let Some(bind) = env(ENV_BIND) {
            config.bind = bind;
        }
        if let Some(catalog) = env(ENV_CATALOG) {
            config.catalog_path = PathBuf::from(catalog);
        }
        if let Some(level) = env(ENV_LOG) {
            log_level = Some(level);
        }

        if let Some(level) = log_level {
            config.log_level = parse_level(&level)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bind",
                message: "bind address must not be empty".to_string(),
            });
        }
        if self.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "catalog",
                message: "catalog path must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_level(raw: &str) -> Result<Level, ConfigError> {
    raw.trim().parse::<Level>().map_err(|_| ConfigError::Invalid {
        field: "log_level",
        message: format!("unknown level '{raw}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = Config::resolve(env_from(&[])).expect("defaults are valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.bind, "127.0.0.1:3000");
        assert_eq!(config.catalog_path, PathBuf::from("data/villagers.csv"));
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "bind: 0.0.0.0:8080\ncatalog: /srv/villagers.csv\nlog_level: warn")
            .expect("write config");
        let path = file.path().to_string_lossy().to_string();

        let config = Config::resolve(env_from(&[
            (ENV_CONFIG_FILE, path.as_str()),
            (ENV_BIND, "127.0.0.1:9000"),
        ]))
        .expect("config should resolve");

        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.catalog_path, PathBuf::from("/srv/villagers.csv"));
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "port: 80").expect("write config");
        let path = file.path().to_string_lossy().to_string();

        let err = Config::resolve(env_from(&[(ENV_CONFIG_FILE, path.as_str())])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_level_and_empty_bind_are_invalid() {
        let err = Config::resolve(env_from(&[(ENV_LOG, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "log_level", .. }));

        let err = Config::resolve(env_from(&[(ENV_BIND, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "bind", .. }));
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let err = Config::resolve(env_from(&[(ENV_CONFIG_FILE, "/no/such/config.yaml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
