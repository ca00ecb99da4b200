//! Content fingerprints.
//!
//! This module provides:
//! - `ContentHash`: A full 64-character SHA-256 hash
//! - `fingerprint()`: Order-sensitive hash of a desired manifest set
//!
//! Fingerprints let log lines from different passes be correlated: two passes
//! that computed the same desired set for a category log the same value.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::manifest::Document;

/// Length of the abbreviated form used in log lines.
pub const SHORT_HASH_LEN: usize = 12;

/// A full 64-character SHA-256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  /// The first [`SHORT_HASH_LEN`] characters.
  pub fn short(&self) -> &str {
    &self.0[..SHORT_HASH_LEN.min(self.0.len())]
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Fingerprint a list of documents.
///
/// Each document is hashed through its compact JSON form followed by a
/// newline, so both content and order affect the result.
pub fn fingerprint(documents: &[Document]) -> ContentHash {
  let mut hasher = Sha256::new();
  for document in documents {
    hasher.update(document.to_string().as_bytes());
    hasher.update(b"\n");
  }
  ContentHash(hex::encode(hasher.finalize()))
}
