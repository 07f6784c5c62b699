// Configuration file handling

use crate::kv::{FileStore, KeyValueStore, SqliteStore, validate_key};
use crate::models::Task;
use crate::record::Record;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_NAME: &str = "tasktrack";

/// Which key-value backend holds the tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the data files
    pub data_dir: PathBuf,
    pub backend: Backend,
    /// Key the task collection is stored under
    pub key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            key: Task::collection_name().to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if it exists
    ///
    /// An explicit path that does not exist is an error; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::load_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        validate_key(&config.key)?;
        Ok(config)
    }

    /// Open the configured backend
    pub fn open_backend(&self) -> Result<Box<dyn KeyValueStore>> {
        debug!(backend = ?self.backend, data_dir = ?self.data_dir, "Opening backend");
        let backend: Box<dyn KeyValueStore> = match self.backend {
            Backend::File => Box::new(FileStore::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteStore::open(&self.data_dir)?),
        };
        Ok(backend)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(format!("{}.yml", APP_NAME)))
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}
