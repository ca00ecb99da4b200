//! Diff computation between a desired manifest set and a destination.
//!
//! This module renders desired documents to their file form and compares them
//! with what a destination directory currently holds, deciding what must be
//! removed, what must be (re)written and what can stay untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};

use serde::Serialize;

use crate::consts::MANIFEST_EXT;
use crate::manifest::{Document, identity};

use super::SyncError;

/// A desired manifest in its materialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedManifest {
  /// File name, `{identity}.yaml`.
  pub file_name: String,
  /// Serialized YAML content.
  pub content: String,
}

/// Changes needed to bring a destination directory to the desired set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
  /// Existing entries not in the desired set, whatever their type or name encoding.
  pub to_remove: Vec<OsString>,

  /// Desired files that are missing or whose content differs.
  pub to_write: Vec<RenderedManifest>,

  /// Desired files already present with identical content.
  pub unchanged: Vec<String>,
}

/// File name a manifest with `identity` is materialized to.
pub fn manifest_file_name(identity: &str) -> String {
  format!("{identity}.{MANIFEST_EXT}")
}

/// Render desired documents to files, in order.
///
/// Serialization is deterministic, so the same document always renders to
/// the same bytes.
pub fn render(desired: &[Document]) -> Result<Vec<RenderedManifest>, SyncError> {
  desired
    .iter()
    .map(|document| {
      let name = identity(document)?;
      if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(SyncError::InvalidName(name.to_string()));
      }
      let content = serde_yaml::to_string(document).map_err(SyncError::Serialize)?;
      Ok(RenderedManifest {
        file_name: manifest_file_name(name),
        content,
      })
    })
    .collect()
}

/// Compute the plan for `desired` against a directory.
///
/// # Arguments
///
/// * `desired` - Rendered desired manifests
/// * `existing` - Entry names currently in the directory
/// * `current` - Raw content of existing files that are also desired
///
/// # Diff Logic
///
/// - Existing entries whose name is not desired → `to_remove`
/// - Desired files missing from `current` or with different bytes → `to_write`
/// - Desired files with identical bytes → `unchanged`
pub fn compute_plan(
  desired: Vec<RenderedManifest>,
  existing: &[OsString],
  current: &BTreeMap<String, Vec<u8>>,
) -> SyncPlan {
  let mut plan = SyncPlan::default();

  let desired_names: BTreeSet<&OsStr> = desired.iter().map(|m| OsStr::new(&m.file_name)).collect();
  plan.to_remove = existing
    .iter()
    .filter(|name| !desired_names.contains(name.as_os_str()))
    .cloned()
    .collect();

  for manifest in desired {
    match current.get(&manifest.file_name) {
      Some(content) if content.as_slice() == manifest.content.as_bytes() => plan.unchanged.push(manifest.file_name),
      _ => plan.to_write.push(manifest),
    }
  }

  plan
}
