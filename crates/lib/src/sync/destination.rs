//! Materialization targets for synchronized manifests.
//!
//! A destination holds one directory per category and one file per manifest.
//! Paths handed to a [`Destination`] are always a category directory name and
//! a plain file name; implementations resolve them against their own root.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DestinationError {
  /// The destination cannot be reached right now; retry on a later event.
  #[error("destination {0} is not ready")]
  NotReady(String),

  #[error("failed to {action} {path}: {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Where manifests are materialized.
pub trait Destination {
  /// Whether the destination can currently be reached.
  fn can_connect(&self) -> bool;

  /// Names of every entry in `dir`, sorted. A missing directory lists as empty.
  ///
  /// Names are not required to be valid UTF-8.
  fn list(&self, dir: &str) -> Result<Vec<OsString>, DestinationError>;

  /// Raw content of `dir/name`, or `None` if it doesn't exist.
  fn read(&self, dir: &str, name: &str) -> Result<Option<Vec<u8>>, DestinationError>;

  /// Create or overwrite `dir/name`.
  fn write(&mut self, dir: &str, name: &str, content: &str) -> Result<(), DestinationError>;

  /// Remove `dir/name`, recursively if it is a directory. Removing a missing
  /// entry succeeds.
  fn delete(&mut self, dir: &str, name: &OsStr) -> Result<(), DestinationError>;

  /// Create `dir` if missing.
  fn make_dir(&mut self, dir: &str) -> Result<(), DestinationError>;

  /// Remove `dir` and everything in it. Removing a missing directory succeeds.
  fn remove_dir(&mut self, dir: &str) -> Result<(), DestinationError>;
}

/// A directory tree on the local filesystem.
///
/// The root is provided by the workload (a mounted volume); until it exists
/// the destination is not ready. Category directories under it are created on
/// demand.
#[derive(Debug, Clone)]
pub struct FsDestination {
  root: PathBuf,
}

impl FsDestination {
  pub fn new(root: PathBuf) -> Self {
    Self { root }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn ensure_ready(&self) -> Result<(), DestinationError> {
    if self.can_connect() {
      Ok(())
    } else {
      Err(DestinationError::NotReady(self.root.display().to_string()))
    }
  }

  fn io_err(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> DestinationError {
    let path = path.to_path_buf();
    move |source| DestinationError::Io { action, path, source }
  }
}

impl Destination for FsDestination {
  fn can_connect(&self) -> bool {
    self.root.is_dir()
  }

  fn list(&self, dir: &str) -> Result<Vec<OsString>, DestinationError> {
    self.ensure_ready()?;
    let path = self.root.join(dir);

    let entries = match fs::read_dir(&path) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(Self::io_err("list", &path)(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
      let entry = entry.map_err(Self::io_err("list", &path))?;
      names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
  }

  fn read(&self, dir: &str, name: &str) -> Result<Option<Vec<u8>>, DestinationError> {
    self.ensure_ready()?;
    let path = self.root.join(dir).join(name);
    match fs::read(&path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(Self::io_err("read", &path)(e)),
    }
  }

  fn write(&mut self, dir: &str, name: &str, content: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    let dir_path = self.root.join(dir);
    let path = dir_path.join(name);

    // Write atomically so the workload never picks up a half-written manifest.
    let temp_path = dir_path.join(format!(".{name}.tmp"));
    fs::write(&temp_path, content).map_err(Self::io_err("write", &temp_path))?;
    fs::rename(&temp_path, &path).map_err(Self::io_err("write", &path))
  }

  fn delete(&mut self, dir: &str, name: &OsStr) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    let path = self.root.join(dir).join(name);
    let result = match fs::symlink_metadata(&path) {
      Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path),
      Ok(_) => fs::remove_file(&path),
      Err(e) => Err(e),
    };
    match result {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Self::io_err("delete", &path)(e)),
    }
  }

  fn make_dir(&mut self, dir: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    let path = self.root.join(dir);
    fs::create_dir_all(&path).map_err(Self::io_err("create", &path))
  }

  fn remove_dir(&mut self, dir: &str) -> Result<(), DestinationError> {
    self.ensure_ready()?;
    let path = self.root.join(dir);
    match fs::remove_dir_all(&path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Self::io_err("remove", &path)(e)),
    }
  }
}
