use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// In-memory database path understood by every driver.
pub const MEMORY_PATH: &str = ":memory:";

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("QUERIST_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => PathBuf::from("querist.toml"),
    })
});

/// Database driver backing a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Sqlite,
}

/// How the database file is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessMode {
    pub read_only: bool,
    pub create: bool,
}

impl Default for AccessMode {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
        }
    }
}

impl AccessMode {
    /// Parses a mode string such as `rwc`, `rw` or `r`.
    ///
    /// `rw` opens read-write, a lone `r` opens read-only and `c` creates the
    /// file when missing.
    pub fn parse(mode: &str) -> Result<Self> {
        if mode.is_empty() || mode.chars().any(|c| !matches!(c, 'r' | 'w' | 'c')) {
            return Err(ConfigError::InvalidMode(mode.to_string()));
        }

        let read_only = if mode.contains("rw") {
            false
        } else if mode.contains('r') {
            true
        } else {
            return Err(ConfigError::InvalidMode(mode.to_string()));
        };

        Ok(Self {
            read_only,
            create: mode.contains('c'),
        })
    }
}

/// Connection options
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Driver to use.
    /// Default: sqlite
    #[serde(default)]
    pub engine: Engine,

    /// Path to the database file, or `:memory:`.
    /// Default: :memory:
    #[serde(default = "default_path")]
    pub path: String,

    /// Access mode, any of `r`, `rw` and `c`.
    /// Default: rwc
    pub mode: Option<String>,

    /// Log every statement sent to the driver.
    /// Default: false
    #[serde(default)]
    pub verbose: bool,
}

fn default_path() -> String {
    MEMORY_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            path: default_path(),
            mode: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Loads the configuration file at [`CONFIG_PATH`], falling back to
    /// the defaults when it does not exist.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "No config at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Applies environment overrides and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("QUERIST_DB") {
            self.path = path;
        }

        if self.path.trim().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        self.access_mode()?;
        Ok(())
    }

    pub fn access_mode(&self) -> Result<AccessMode> {
        match &self.mode {
            Some(mode) => AccessMode::parse(mode),
            None => Ok(AccessMode::default()),
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }

    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default().save()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::test_utils::{with_config_path, with_env};

    #[test]
    fn test_access_mode_parse() {
        assert_eq!(
            AccessMode::parse("rwc").unwrap(),
            AccessMode {
                read_only: false,
                create: true
            }
        );
        assert_eq!(
            AccessMode::parse("rw").unwrap(),
            AccessMode {
                read_only: false,
                create: false
            }
        );
        assert_eq!(
            AccessMode::parse("r").unwrap(),
            AccessMode {
                read_only: true,
                create: false
            }
        );
    }

    #[test]
    fn test_access_mode_rejects_invalid() {
        assert!(matches!(
            AccessMode::parse("rx"),
            Err(ConfigError::InvalidMode(_))
        ));
        assert!(matches!(AccessMode::parse(""), Err(ConfigError::InvalidMode(_))));
        assert!(matches!(AccessMode::parse("c"), Err(ConfigError::InvalidMode(_))));
        assert!(matches!(AccessMode::parse("w"), Err(ConfigError::InvalidMode(_))));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine, Engine::Sqlite);
        assert!(config.is_memory());
        assert_eq!(config.access_mode().unwrap(), AccessMode::default());
        assert!(!config.verbose);
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            engine = "sqlite"
            path = "app.db"
            mode = "r"
            verbose = true
            "#,
        )
        .unwrap();

        assert_eq!(config.path, "app.db");
        assert!(config.verbose);
        assert!(config.access_mode().unwrap().read_only);
    }

    #[test]
    fn test_parse_toml_unknown_engine() {
        let result: std::result::Result<Config, _> = toml::from_str(r#"engine = "oracle""#);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        with_config_path(dir.path().join("missing.toml"), || {
            let config = Config::new().unwrap();
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    #[serial]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        with_config_path(dir.path().join("nested").join("querist.toml"), || {
            let config = Config {
                path: "data.db".to_string(),
                mode: Some("rw".to_string()),
                ..Config::default()
            };
            config.save().unwrap();

            let loaded = Config::new().unwrap();
            assert_eq!(loaded, config);
            assert!(matches!(
                generate_default_config(),
                Err(ConfigError::ConfigAlreadyExists)
            ));
        });
    }

    #[test]
    #[serial]
    fn test_load_rejects_invalid_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("querist.toml");
        fs::write(&path, "mode = \"x\"\n").unwrap();
        with_config_path(path, || {
            assert!(matches!(Config::new(), Err(ConfigError::InvalidMode(_))));
        });
    }

    #[test]
    #[serial]
    fn test_env_overrides_path() {
        with_env(vec![("QUERIST_DB", "/tmp/override.db")], || {
            let mut config = Config::default();
            config.resolve().unwrap();
            assert_eq!(config.path, "/tmp/override.db");
        });
    }
}
