//! Wire codec for manifests carried in relation data.
//!
//! Each producer publishes its manifests under a single relation data key as a
//! JSON array of parsed documents. Only the parsed form travels: the raw YAML
//! text of a [`Manifest`] is not preserved across the relation.

use thiserror::Error;

use crate::manifest::{Document, Manifest};

/// Errors raised by the relation data codec.
#[derive(Debug, Error)]
pub enum ChannelError {
  /// The manifests could not be serialized.
  #[error("failed to encode manifests: {0}")]
  Encode(#[source] serde_json::Error),

  /// The payload is not valid JSON.
  #[error("failed to decode manifests: {0}")]
  Decode(#[source] serde_json::Error),

  /// The payload is valid JSON but not a list.
  #[error("manifests payload is not a list")]
  NotAList,
}

/// Encode manifests for a relation data slot, preserving order.
pub fn encode(manifests: &[Manifest]) -> Result<String, ChannelError> {
  let documents: Vec<&Document> = manifests.iter().map(Manifest::document).collect();
  serde_json::to_string(&documents).map_err(ChannelError::Encode)
}

/// Decode a relation data slot into documents.
///
/// An absent or blank payload means the producer has not sent anything yet
/// and decodes to an empty list.
pub fn decode(payload: Option<&str>) -> Result<Vec<Document>, ChannelError> {
  let payload = match payload {
    Some(payload) if !payload.trim().is_empty() => payload,
    _ => return Ok(Vec::new()),
  };

  match serde_json::from_str(payload).map_err(ChannelError::Decode)? {
    Document::Array(documents) => Ok(documents),
    _ => Err(ChannelError::NotAList),
  }
}
