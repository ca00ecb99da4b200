//! Collision checks for merged manifests.
//!
//! Manifest names must be unique across every producer of a category, since
//! the name is both the Kubernetes object name and the destination file name.
//! A collision is never repaired here: the caller aborts the category.

use std::collections::{BTreeMap, BTreeSet};

use crate::manifest::{Document, ManifestError, identity};

/// The identity of every document, in order.
///
/// Fails on the first document without `metadata.name`.
pub fn identities(documents: &[Document]) -> Result<Vec<&str>, ManifestError> {
  documents.iter().map(identity).collect()
}

/// Identities declared more than once, sorted, each listed once.
///
/// Documents without a name are ignored; use [`identities`] to reject them.
pub fn collisions(documents: &[Document]) -> Vec<String> {
  let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
  for name in documents.iter().filter_map(|d| identity(d).ok()) {
    *counts.entry(name).or_default() += 1;
  }
  counts
    .into_iter()
    .filter(|(_, count)| *count > 1)
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Whether every identity in `documents` is unique.
pub fn validate(documents: &[Document]) -> bool {
  let mut seen = BTreeSet::new();
  documents
    .iter()
    .filter_map(|d| identity(d).ok())
    .all(|name| seen.insert(name))
}
