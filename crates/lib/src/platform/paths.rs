use crate::consts::{APP_NAME, CONFIG_FILENAME, STATE_FILENAME};
use std::path::PathBuf;

fn env_path(var: &str) -> Option<PathBuf> {
  std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  env_path("USERPROFILE")
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  env_path("HOME")
}

/// Returns the directory for configuration files for the application
#[cfg(windows)]
pub fn config_dir() -> Option<PathBuf> {
  env_path("APPDATA").map(|p| p.join(APP_NAME))
}

/// Returns the directory for configuration files for the application
#[cfg(not(windows))]
pub fn config_dir() -> Option<PathBuf> {
  let config_home = env_path("XDG_CONFIG_HOME").or_else(|| home_dir().map(|h| h.join(".config")))?;
  Some(config_home.join(APP_NAME))
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> Option<PathBuf> {
  env_path("APPDATA").map(|p| p.join(APP_NAME))
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> Option<PathBuf> {
  let data_home = env_path("XDG_DATA_HOME").or_else(|| home_dir().map(|h| h.join(".local").join("share")))?;
  Some(data_home.join(APP_NAME))
}

/// Default relation store location, `{data_dir}/relations.json`.
///
/// Falls back to the working directory when no data directory is known.
pub fn default_state_file() -> PathBuf {
  data_dir().unwrap_or_default().join(STATE_FILENAME)
}

/// Default configuration file, `{config_dir}/config.yaml`, if a config directory is known.
pub fn default_config_file() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}
