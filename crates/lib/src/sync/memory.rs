use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use super::destination::{Destination, DestinationError};

/// An in-process destination.
///
/// Counts writes so callers can check how much a sync actually touched, and
/// can be taken offline to exercise the not-ready path.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
  dirs: BTreeMap<String, BTreeMap<String, String>>,
  offline: bool,
  writes: usize,
}

impl MemoryDestination {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_offline(&mut self, offline: bool) {
    self.offline = offline;
  }

  /// Number of file writes performed so far.
  pub fn writes(&self) -> usize {
    self.writes
  }

  /// Files of `dir` with their content, if the directory exists.
  pub fn files(&self, dir: &str) -> Option<&BTreeMap<String, String>> {
    self.dirs.get(dir)
  }

  pub fn has_dir(&self, dir: &str) -> bool {
    self.dirs.contains_key(dir)
  }

  fn ensure_ready(&self) -> Result<(), DestinationError> {
    if self.offline {
      Err(DestinationError::NotReady("memory".to_string()))
    } else {
      Ok(())
    }
  }
}

impl Destination for MemoryDestination {
  fn can_connect(&self) -> bool {
    !self.offline
  }

  fn list(&self, dir: &str) -> Result<Vec<OsString>, DestinationError> {
    self.ensure_ready()?;
    Ok(
      self
        .dirs
        .get(dir)
        .map(|files| files.keys().map(OsString::from).collect())
        .unwrap_or_default(),
    )
  }

  fn read(&self, dir: &str, name: &str) -> Result<Option<Vec<u8>>, DestinationError> {
    self.ensure_ready()?;
    Ok(
      self
        .dirs
        .get(dir)
        .and_then(|files| files.get(name))
        .map(|content| content.as_bytes().to_vec()),
    )
  }

  fn write(&mut self, dir: &str, name: &str, content: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    self
      .dirs
      .entry(dir.to_string())
      .or_default()
      .insert(name.to_string(), content.to_string());
    self.writes += 1;
    Ok(())
  }

  fn delete(&mut self, dir: &str, name: &OsStr) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    if let Some(files) = self.dirs.get_mut(dir)
      && let Some(name) = name.to_str()
    {
      files.remove(name);
    }
    Ok(())
  }

  fn make_dir(&mut self, dir: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    self.dirs.entry(dir.to_string()).or_default();
    Ok(())
  }

  fn remove_dir(&mut self, dir: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    self.dirs.remove(dir);
    Ok(())
  }
}
