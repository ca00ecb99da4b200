//! Provider (dispatcher) side of a manifests relation.
//!
//! A [`ManifestsProvider`] owns one category. It merges the manifests every
//! connected producer published and tells the dispatcher when that merged
//! view may have changed.

mod teardown;

pub use teardown::departing_producer_for;

use thiserror::Error;
use tracing::debug;

use crate::channel::{self, ChannelError};
use crate::consts::KUBERNETES_MANIFESTS_FIELD;
use crate::events::{Event, EventKind};
use crate::manifest::Document;
use crate::relation::{RelationId, Relations};

#[derive(Debug, Error)]
pub enum ProviderError {
  /// A producer's payload could not be unpacked.
  #[error("unexpected error unpacking {category} data from {app} (relation {relation_id}): {source}")]
  Unpack {
    category: String,
    relation_id: RelationId,
    app: String,
    #[source]
    source: ChannelError,
  },
}

/// Notification that a category's merged manifests may have changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestsUpdated {
  pub category: String,
  /// Relation whose change triggered the notification, if any.
  pub relation_id: Option<RelationId>,
}

/// Merges one category's manifests across producers.
#[derive(Debug, Clone)]
pub struct ManifestsProvider {
  app: String,
  category: String,
  refresh_events: Vec<EventKind>,
}

impl ManifestsProvider {
  /// `app` is the dispatcher's own application name.
  pub fn new(app: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      app: app.into(),
      category: category.into(),
      refresh_events: Vec::new(),
    }
  }

  /// Also report an update on these event kinds.
  pub fn with_refresh_events(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
    self.refresh_events.extend(kinds);
    self
  }

  pub fn category(&self) -> &str {
    &self.category
  }

  /// Event kinds that may change this category's merged manifests.
  pub fn observed_kinds(&self) -> Vec<EventKind> {
    let mut kinds = vec![
      EventKind::RelationChanged(self.category.clone()),
      EventKind::RelationBroken(self.category.clone()),
    ];
    for kind in &self.refresh_events {
      if !kinds.contains(kind) {
        kinds.push(kind.clone());
      }
    }
    kinds
  }

  /// Emit an update notification if `event` concerns this category.
  pub fn observe(&self, event: &Event) -> Option<ManifestsUpdated> {
    if !self.observed_kinds().contains(&event.kind()) {
      return None;
    }
    Some(ManifestsUpdated {
      category: self.category.clone(),
      relation_id: event.relation().map(|rel| rel.relation_id),
    })
  }

  /// Every producer's manifests for this category, concatenated.
  ///
  /// Relations are read in ascending relation id order and each producer's
  /// list keeps the order it was sent in, so the result is the same for the
  /// same relation data. Relations with `departing` on the other side are
  /// skipped.
  pub fn get_manifests(&self, relations: &Relations, departing: Option<&str>) -> Result<Vec<Document>, ProviderError> {
    if let Some(app) = departing {
      debug!(
        category = %self.category,
        app = %app,
        "relation is breaking, excluding manifests of departing app"
      );
    }

    let mut manifests = Vec::new();
    for relation in relations.for_category(&self.category) {
      if relation.remote_app == self.app || Some(relation.remote_app.as_str()) == departing {
        continue;
      }

      let documents =
        channel::decode(relation.remote(KUBERNETES_MANIFESTS_FIELD)).map_err(|source| ProviderError::Unpack {
          category: self.category.clone(),
          relation_id: relation.id,
          app: relation.remote_app.clone(),
          source,
        })?;
      manifests.extend(documents);
    }

    debug!(category = %self.category, count = manifests.len(), "merged manifests");
    Ok(manifests)
  }
}
