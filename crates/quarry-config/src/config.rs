use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
    paths::{resolve_path, xdg_config_home, xdg_data_home},
};

pub const DEFAULT_BUSY_TIMEOUT: u64 = 5000;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Quarry configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Path to the SQLite database file.
    /// Default: $XDG_DATA_HOME/quarry/quarry.db
    pub db_path: Option<String>,

    /// Milliseconds a statement waits on a locked database before failing.
    /// Default: 5000
    pub busy_timeout: Option<u64>,

    /// Default number of rows per page for `list`.
    /// Default: 20
    pub page_size: Option<u32>,

    /// Largest page size accepted from the command line.
    /// Default: 100
    pub max_page_size: Option<u32>,
}

/// Location of the config file: `$QUARRY_CONFIG`, else
/// `$XDG_CONFIG_HOME/quarry/config.toml`.
pub fn config_path() -> PathBuf {
    match std::env::var("QUARRY_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("quarry").join("config.toml"),
    }
}

impl Config {
    /// A configuration with every default filled in.
    pub fn default_config() -> Self {
        Self {
            db_path: Some(format!("{}/quarry/quarry.db", xdg_data_home().display())),
            busy_timeout: Some(DEFAULT_BUSY_TIMEOUT),
            page_size: Some(DEFAULT_PAGE_SIZE),
            max_page_size: Some(DEFAULT_MAX_PAGE_SIZE),
        }
    }

    /// Loads and resolves the configuration at `path`; a missing file yields
    /// the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loading configuration");
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    /// Fills unset values with defaults and validates page sizes.
    pub fn resolve(&mut self) -> Result<()> {
        let defaults = Self::default_config();

        if self.db_path.is_none() {
            self.db_path = defaults.db_path;
        }
        self.busy_timeout.get_or_insert(DEFAULT_BUSY_TIMEOUT);
        let page_size = *self.page_size.get_or_insert(DEFAULT_PAGE_SIZE);
        let max_page_size = *self.max_page_size.get_or_insert(DEFAULT_MAX_PAGE_SIZE);

        if page_size == 0 {
            return Err(ConfigError::InvalidValue("page_size must be at least 1".into()));
        }
        if max_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "max_page_size must be at least 1".into(),
            ));
        }
        if page_size > max_page_size {
            return Err(ConfigError::InvalidValue(format!(
                "page_size ({page_size}) exceeds max_page_size ({max_page_size})"
            )));
        }

        Ok(())
    }

    /// The database file, honouring `$QUARRY_DB`.
    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("QUARRY_DB") {
            return resolve_path(&env_path);
        }
        match &self.db_path {
            Some(path) => resolve_path(path),
            None => Ok(xdg_data_home().join("quarry").join("quarry.db")),
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout.unwrap_or(DEFAULT_BUSY_TIMEOUT))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Serialises the configuration with each field's docs as comments.
    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let mut doc = self.to_toml()?.parse::<DocumentMut>()?;
        annotate_toml_table::<Config>(doc.as_table_mut())?;
        Ok(doc)
    }
}

/// Writes the documented default configuration to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigAlreadyExists`] rather than overwriting an
/// existing file.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.display().to_string()));
    }

    let doc = Config::default_config().to_annotated_document()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, doc.to_string())?;

    info!(
        "Default configuration file generated with documentation at: {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::with_env;

    #[test]
    fn test_default_config_values() {
        let config = Config::default_config();

        assert!(config.db_path.unwrap().ends_with("quarry/quarry.db"));
        assert_eq!(config.busy_timeout, Some(5000));
        assert_eq!(config.page_size, Some(20));
        assert_eq!(config.max_page_size, Some(100));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.page_size(), 20);
        assert_eq!(config.busy_timeout(), Duration::from_millis(5000));
        assert!(config.db_path.is_some());
    }

    #[test]
    fn test_partial_file_is_resolved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = 50\nbusy_timeout = 250\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size(), 50);
        assert_eq!(config.max_page_size(), 100);
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_page_sizes() {
        let mut config = Config {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidValue(_))));

        let mut config = Config {
            page_size: Some(200),
            max_page_size: Some(100),
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "page_size = \"many\"").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        with_env(vec![("QUARRY_CONFIG", "/etc/quarry.toml")], || {
            assert_eq!(config_path(), PathBuf::from("/etc/quarry.toml"));
        });
        with_env(vec![("XDG_CONFIG_HOME", "/cfg")], || {
            std::env::remove_var("QUARRY_CONFIG");
            assert_eq!(config_path(), PathBuf::from("/cfg/quarry/config.toml"));
        });
    }

    #[test]
    #[serial]
    fn test_db_path_env_override() {
        let config = Config {
            db_path: Some("/var/lib/quarry.db".into()),
            ..Default::default()
        };
        std::env::remove_var("QUARRY_DB");
        assert_eq!(
            config.get_db_path().unwrap(),
            PathBuf::from("/var/lib/quarry.db")
        );

        with_env(vec![("QUARRY_DB", "/tmp/override.db")], || {
            assert_eq!(
                config.get_db_path().unwrap(),
                PathBuf::from("/tmp/override.db")
            );
        });
    }

    #[test]
    fn test_to_toml_round_trip() {
        let config = Config::default_config();
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_generate_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        generate_default_config(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Path to the SQLite database file."));

        assert!(matches!(
            generate_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }
}
