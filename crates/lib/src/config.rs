//! Dispatcher configuration.
//!
//! Configuration is resolved in layers, later layers winning:
//! 1. Built-in defaults
//! 2. A YAML file (explicit path, or `{config_dir}/config.yaml` if it exists)
//! 3. Environment overrides (`DISPATCH_RESOURCES_ROOT`, `DISPATCH_STATE_FILE`)
//!
//! Command-line flags are applied on top by the binary.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{APP_NAME, DEFAULT_CATEGORIES, DEFAULT_RESOURCES_ROOT};
use crate::platform::paths::{default_config_file, default_state_file};

pub const ENV_RESOURCES_ROOT: &str = "DISPATCH_RESOURCES_ROOT";
pub const ENV_STATE_FILE: &str = "DISPATCH_STATE_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("invalid config: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
  /// The dispatcher's own application name. Data written by this app is never
  /// read back as producer input.
  pub app_name: String,

  /// Directory holding one subdirectory per category.
  pub resources_root: PathBuf,

  /// Categories to reconcile, in order.
  pub categories: Vec<String>,

  /// Relation store location. Defaults to `{data_dir}/relations.json`.
  pub state_file: Option<PathBuf>,
}

impl Default for DispatcherConfig {
  fn default() -> Self {
    Self {
      app_name: APP_NAME.to_string(),
      resources_root: PathBuf::from(DEFAULT_RESOURCES_ROOT),
      categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
      state_file: None,
    }
  }
}

impl DispatcherConfig {
  /// Load configuration from `path`, or from the default location when `None`.
  ///
  /// An explicit path must exist. The default location is optional.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let mut config = match path {
      Some(path) => Self::from_file(path)?,
      None => match default_config_file().filter(|p| p.is_file()) {
        Some(path) => Self::from_file(&path)?,
        None => Self::default(),
      },
    };
    config.apply_env();
    config.validate()?;
    Ok(config)
  }

  /// Parse a YAML configuration file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
  }

  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file is all defaults.
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(content)
  }

  /// Apply environment overrides.
  pub fn apply_env(&mut self) {
    if let Some(root) = std::env::var_os(ENV_RESOURCES_ROOT).filter(|v| !v.is_empty()) {
      self.resources_root = PathBuf::from(root);
    }
    if let Some(state) = std::env::var_os(ENV_STATE_FILE).filter(|v| !v.is_empty()) {
      self.state_file = Some(PathBuf::from(state));
    }
  }

  /// Check the configuration is usable.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.app_name.is_empty() {
      return Err(ConfigError::Invalid("app_name must not be empty".to_string()));
    }
    if self.categories.is_empty() {
      return Err(ConfigError::Invalid("at least one category is required".to_string()));
    }

    let mut seen = BTreeSet::new();
    for category in &self.categories {
      if category.is_empty() || category.contains(['/', '\\']) || category == "." || category == ".." {
        return Err(ConfigError::Invalid(format!("category {category:?} is not a valid directory name")));
      }
      if !seen.insert(category.as_str()) {
        return Err(ConfigError::Invalid(format!("category {category} is listed twice")));
      }
    }
    Ok(())
  }

  /// The relation store location, falling back to the platform default.
  pub fn state_file(&self) -> PathBuf {
    self.state_file.clone().unwrap_or_else(default_state_file)
  }
}
