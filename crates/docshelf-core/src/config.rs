//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/docshelf/config.toml)
//! 3. Environment variables (DOCSHELF_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::importer::{SuffixStyle, DEFAULT_MAX_ATTEMPTS};
use crate::models::ReferenceMode;
use crate::storage::Language;

/// Environment variable prefix
const ENV_PREFIX: &str = "DOCSHELF";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for application data (the record store lives under it)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Managed directory for imported documents (default: `<data_dir>/Documents`)
    #[serde(default)]
    pub documents_dir: Option<PathBuf>,

    /// How list entries refer to their documents
    #[serde(default)]
    pub reference_mode: ReferenceMode,

    /// Counter format used when an imported name is taken
    #[serde(default)]
    pub suffix_style: SuffixStyle,

    /// Give up finding a free name after this many suffixes
    #[serde(default = "default_max_collision_attempts")]
    pub max_collision_attempts: u32,

    /// Language for user-facing store error descriptions
    #[serde(default)]
    pub language: Language,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            documents_dir: None,
            reference_mode: ReferenceMode::default(),
            suffix_style: SuffixStyle::default(),
            max_collision_attempts: DEFAULT_MAX_ATTEMPTS,
            language: Language::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (DOCSHELF_DATA_DIR, DOCSHELF_DOCUMENTS_DIR, ...)
    /// 2. Config file (~/.config/docshelf/config.toml or DOCSHELF_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Read only what the config file says, without env overrides
    ///
    /// This is the starting point for editing the file. Defaults are used if
    /// it doesn't exist.
    pub fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // DOCSHELF_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // DOCSHELF_DOCUMENTS_DIR
        if let Ok(val) = std::env::var(format!("{}_DOCUMENTS_DIR", ENV_PREFIX)) {
            self.documents_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        // DOCSHELF_REFERENCE_MODE
        if let Ok(val) = std::env::var(format!("{}_REFERENCE_MODE", ENV_PREFIX)) {
            self.reference_mode = val
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid DOCSHELF_REFERENCE_MODE")?;
        }

        // DOCSHELF_LANGUAGE
        if let Ok(val) = std::env::var(format!("{}_LANGUAGE", ENV_PREFIX)) {
            self.language = Language::from_code(&val)
                .with_context(|| format!("Invalid DOCSHELF_LANGUAGE '{}' (use en or he)", val))?;
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with DOCSHELF_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docshelf")
            .join("config.toml")
    }

    /// Directory holding the key-value records
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Managed directory where imported documents are copied
    pub fn documents_dir(&self) -> PathBuf {
        self.documents_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("Documents"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docshelf")
}

fn default_max_collision_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
