//! Relation state storage.
//!
//! The hook runner keeps the shared relation namespace in a single JSON file
//! so that producer pushes and dispatcher passes made by separate invocations
//! see the same data.
//!
//! # Storage Layout
//!
//! ```text
//! {data_dir}/relations.json   # Relations: every open relation and its bags
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::types::{RELATIONS_VERSION, Relations};

/// Errors that can occur when loading or saving relation state.
#[derive(Debug, Error)]
pub enum RelationStoreError {
  #[error("failed to read relation state: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write relation state: {0}")]
  Write(#[source] io::Error),

  #[error("failed to create relation state directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to parse relation state: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize relation state: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported relation state version: {0}")]
  UnsupportedVersion(u32),
}

/// Reads and writes [`Relations`] at a fixed path.
#[derive(Debug, Clone)]
pub struct RelationStore {
  path: PathBuf,
}

impl RelationStore {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load relation state.
  ///
  /// Returns empty state if the file doesn't exist.
  pub fn load(&self) -> Result<Relations, RelationStoreError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Relations::new()),
      Err(e) => return Err(RelationStoreError::Read(e)),
    };

    let relations: Relations = serde_json::from_str(&content).map_err(RelationStoreError::Parse)?;

    if relations.version != RELATIONS_VERSION {
      return Err(RelationStoreError::UnsupportedVersion(relations.version));
    }

    debug!(path = %self.path.display(), count = relations.len(), "loaded relation state");
    Ok(relations)
  }

  /// Save relation state.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent corruption.
  pub fn save(&self, relations: &Relations) -> Result<(), RelationStoreError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(RelationStoreError::CreateDir)?;
    }

    let content = serde_json::to_string_pretty(relations).map_err(RelationStoreError::Serialize)?;
    let temp_path = self.path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(RelationStoreError::Write)?;
    fs::rename(&temp_path, &self.path).map_err(RelationStoreError::Write)?;

    debug!(path = %self.path.display(), count = relations.len(), "saved relation state");
    Ok(())
  }
}
