//! Manifest types for the dispatcher.
//!
//! A [`Manifest`] is the unit producers send over a relation: the raw YAML
//! text of one Kubernetes object together with its parsed form.
//!
//! # Structure
//!
//! The parsed form is a [`Document`], a JSON value with insertion-ordered maps.
//! The dispatcher is kind-agnostic: apart from `metadata.name`, nothing in a
//! document is interpreted.
//!
//! # Identity
//!
//! `metadata.name` is the collision key across producers and the stem of the
//! file a manifest is materialized to.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Parsed structured form of a manifest.
pub type Document = serde_json::Value;

/// Errors raised while building or inspecting manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The raw text is not valid YAML.
  #[error("invalid manifest yaml: {0}")]
  Parse(#[source] serde_yaml::Error),

  /// The document has no string at `metadata.name`.
  #[error("manifest has no metadata.name")]
  MissingName,

  /// A manifest file could not be read.
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// A manifest file could be read but not parsed.
  #[error("invalid manifest {path}: {source}")]
  ParseFile {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

/// One Kubernetes object as sent by a producer.
///
/// Construction parses eagerly, so malformed YAML is rejected on the producer
/// side before anything is transmitted. The value is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
  content: String,
  document: Document,
}

impl Manifest {
  /// Parse `content` into a manifest.
  pub fn new(content: impl Into<String>) -> Result<Self, ManifestError> {
    let content = content.into();
    let document = serde_yaml::from_str(&content).map_err(ManifestError::Parse)?;
    Ok(Self { content, document })
  }

  /// Read and parse a manifest file.
  pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let document = serde_yaml::from_str(&content).map_err(|source| ManifestError::ParseFile {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self { content, document })
  }

  /// Load every `*.yaml` / `*.yml` file of `dir`, ordered by file name.
  pub fn load_dir(dir: &Path) -> Result<Vec<Self>, ManifestError> {
    let read_err = |source| ManifestError::Read {
      path: dir.to_path_buf(),
      source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
      let path = entry.map_err(read_err)?.path();
      let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
      if is_yaml && path.is_file() {
        paths.push(path);
      }
    }
    paths.sort();

    paths.iter().map(|path| Self::from_file(path)).collect()
  }

  /// The raw text this manifest was built from.
  pub fn content(&self) -> &str {
    &self.content
  }

  /// The parsed document.
  pub fn document(&self) -> &Document {
    &self.document
  }

  /// The manifest's `metadata.name`.
  pub fn identity(&self) -> Result<&str, ManifestError> {
    identity(&self.document)
  }
}

/// Return `metadata.name` of a parsed document.
pub fn identity(document: &Document) -> Result<&str, ManifestError> {
  document
    .get("metadata")
    .and_then(|metadata| metadata.get("name"))
    .and_then(|name| name.as_str())
    .ok_or(ManifestError::MissingName)
}
