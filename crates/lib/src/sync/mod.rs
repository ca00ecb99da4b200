//! Synchronization of a desired manifest set to a destination directory.
//!
//! [`reconcile`] makes one category directory hold exactly one file per
//! desired manifest:
//! - Creates the directory if missing
//! - Removes files that are no longer desired
//! - Writes desired files that are missing or changed
//!
//! Unchanged files are not rewritten, so repeating a sync with the same input
//! performs no writes.

mod destination;
mod memory;
mod plan;

pub use destination::{Destination, DestinationError, FsDestination};
pub use memory::MemoryDestination;
pub use plan::{RenderedManifest, SyncPlan, compute_plan, manifest_file_name, render};

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::manifest::{Document, ManifestError};

#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  /// The manifest name can't be used as a file name.
  #[error("manifest name {0:?} is not a valid file name")]
  InvalidName(String),

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_yaml::Error),

  #[error(transparent)]
  Destination(#[from] DestinationError),
}

impl SyncError {
  /// Whether the failure is the destination being unreachable.
  pub fn is_not_ready(&self) -> bool {
    matches!(self, SyncError::Destination(DestinationError::NotReady(_)))
  }
}

/// What a sync did to a destination directory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
  pub written: Vec<String>,
  pub removed: Vec<String>,
  pub unchanged: usize,
}

impl SyncReport {
  pub fn is_noop(&self) -> bool {
    self.written.is_empty() && self.removed.is_empty()
  }
}

/// Make `location` on `destination` hold exactly the `desired` manifests.
///
/// `desired` is expected to be collision-free. Removals happen before writes.
pub fn reconcile(
  desired: &[Document],
  destination: &mut dyn Destination,
  location: &str,
) -> Result<SyncReport, SyncError> {
  let rendered = render(desired)?;

  destination.make_dir(location)?;
  let existing = destination.list(location)?;

  let mut current = BTreeMap::new();
  for manifest in &rendered {
    if existing.iter().any(|name| name == manifest.file_name.as_str())
      && let Some(content) = destination.read(location, &manifest.file_name)?
    {
      current.insert(manifest.file_name.clone(), content);
    }
  }

  let plan = compute_plan(rendered, &existing, &current);
  debug!(
    location,
    remove = plan.to_remove.len(),
    write = plan.to_write.len(),
    unchanged = plan.unchanged.len(),
    "computed sync plan"
  );

  let mut report = SyncReport {
    unchanged: plan.unchanged.len(),
    ..Default::default()
  };

  for name in plan.to_remove {
    destination.delete(location, &name)?;
    let name = name.to_string_lossy().into_owned();
    debug!(location, file = %name, "removed stale entry");
    report.removed.push(name);
  }

  for manifest in plan.to_write {
    destination.write(location, &manifest.file_name, &manifest.content)?;
    debug!(location, file = %manifest.file_name, "wrote manifest");
    report.written.push(manifest.file_name);
  }

  if !report.is_noop() {
    info!(
      location,
      written = report.written.len(),
      removed = report.removed.len(),
      unchanged = report.unchanged,
      "synchronized manifests"
    );
  }

  Ok(report)
}
