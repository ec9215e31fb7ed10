// src/config.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::domain::error::DomainResult;

pub const DEFAULT_DB_NAME: &str = "gomarks.db";

/// Process-wide configuration (§4.K). Resolved once at startup and
/// threaded explicitly into every component that needs it — no global
/// singleton, per the re-architecture note in §9 (the source kept this
/// behind a lazily-initialized static; this crate passes the resolved
/// value around instead, the same way the store's pool or the mirror's
/// root are passed rather than looked up).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding `.db` files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory backups are written into.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Mirror/git root.
    #[serde(default = "default_mirror_root")]
    pub mirror_root: PathBuf,

    #[serde(default = "default_db_name")]
    pub default_db_name: String,

    #[serde(default)]
    pub backup_retention: i64,

    #[serde(skip)]
    pub source: ConfigSource,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    ConfigFile,
    Environment,
}

fn base_dir() -> PathBuf {
    if let Ok(home) = std::env::var("GOMARKS_HOME") {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        .join("gomarks")
}

fn default_data_dir() -> PathBuf {
    base_dir()
}

fn default_backup_dir() -> PathBuf {
    base_dir().join("backups")
}

fn default_mirror_root() -> PathBuf {
    base_dir().join("mirror")
}

fn default_db_name() -> String {
    DEFAULT_DB_NAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backup_dir: default_backup_dir(),
            mirror_root: default_mirror_root(),
            default_db_name: default_db_name(),
            backup_retention: 5,
            source: ConfigSource::Default,
        }
    }
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.default_db_name)
    }

    /// Every `.db` file under `data_dir`, as discovered at startup.
    pub fn discover_databases(&self) -> DomainResult<Vec<PathBuf>> {
        if !self.data_dir.exists() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("db") {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Resolution precedence: explicit `config_file` → `$GOMARKS_HOME`'s
    /// `config.toml` → built-in defaults, each layer then subject to
    /// environment overrides.
    pub fn load(config_file: Option<&Path>) -> DomainResult<Config> {
        let mut config = Config::default();

        if let Some(path) = config_file {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(text) => match toml::from_str::<Config>(&text) {
                        Ok(mut parsed) => {
                            parsed.source = ConfigSource::ConfigFile;
                            config = parsed;
                        }
                        Err(e) => warn!(?path, error = %e, "failed to parse config file"),
                    },
                    Err(e) => warn!(?path, error = %e, "failed to read config file"),
                }
            } else {
                warn!(?path, "specified config file does not exist");
            }
        } else {
            let default_path = base_dir().join("config.toml");
            if default_path.exists() {
                if let Ok(text) = std::fs::read_to_string(&default_path) {
                    if let Ok(mut parsed) = toml::from_str::<Config>(&text) {
                        parsed.source = ConfigSource::ConfigFile;
                        config = parsed;
                    }
                }
            }
        }

        apply_env_overrides(&mut config);

        if config.source == ConfigSource::Default {
            debug!("no configuration file found, using defaults");
        }
        trace!(?config, "configuration resolved");
        Ok(config)
    }
}

fn apply_env_overrides(config: &mut Config) {
    let mut used_env = false;

    if let Ok(home) = std::env::var("GOMARKS_HOME") {
        config.data_dir = PathBuf::from(home);
        used_env = true;
    }

    if let Ok(limit) = std::env::var("GOMARKS_BACKUP_MAX") {
        if let Ok(n) = limit.parse::<i64>() {
            config.backup_retention = n;
            used_env = true;
        }
    }

    if used_env && config.source == ConfigSource::Default {
        config.source = ConfigSource::Environment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_joins_data_dir_and_default_name() {
        let mut config = Config::default();
        config.data_dir = PathBuf::from("/tmp/gomarks");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/gomarks/gomarks.db"));
    }

    #[test]
    fn discover_databases_returns_empty_for_missing_dir() {
        let mut config = Config::default();
        config.data_dir = PathBuf::from("/tmp/gomarks-does-not-exist-xyz");
        assert!(config.discover_databases().unwrap().is_empty());
    }
}
