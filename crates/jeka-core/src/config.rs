use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jeka_util::errors::JekaError;
use jeka_util::fs::{expand_home, home_dir};

/// Global user configuration loaded from `~/.jeka/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Repositories appended after the project's own.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,

    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialEntry>,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Credential entry for a named repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Download cache configuration from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl CacheConfig {
    /// The cache directory with `~/` expanded.
    pub fn path(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

fn default_cache_dir() -> String {
    "~/.jeka/cache".to_string()
}

impl GlobalConfig {
    /// Load `~/.jeka/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load a global configuration file, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| JekaError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            JekaError::Config {
                message: format!("Failed to parse global config: {e}"),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        jeka_home().join("config.toml")
    }
}

/// Returns the path to the Jeka data directory (`~/.jeka/`).
pub fn jeka_home() -> PathBuf {
    home_dir().join(".jeka")
}
