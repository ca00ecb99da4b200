//! Producer (requirer) side of a manifests relation.
//!
//! A producer publishes the full list of its manifests for one category into
//! its own data bag on every relation of that category. Every push replaces
//! the previous payload wholesale.
//!
//! Two flavours exist:
//! - [`ManifestsRequirer`] for manifests known up front, re-sent on the events
//!   it observes.
//! - [`RequirerWrapper`] for manifests rendered on demand; the caller decides
//!   when to call [`RequirerWrapper::send_data`].

use thiserror::Error;
use tracing::{debug, info};

use crate::channel::{self, ChannelError};
use crate::consts::KUBERNETES_MANIFESTS_FIELD;
use crate::events::{Event, EventKind};
use crate::leader::Leadership;
use crate::manifest::Manifest;
use crate::relation::Relations;

#[derive(Debug, Error)]
pub enum ProducerError {
  #[error(transparent)]
  Channel(#[from] ChannelError),
}

/// What a push did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
  /// This unit is not the leader; nothing was written.
  NotLeader,
  /// The payload was written to this many relations.
  Sent { relations: usize },
}

/// Sends a rendered list of manifests on every relation of one category.
#[derive(Debug, Clone)]
pub struct RequirerWrapper {
  app: String,
  category: String,
}

impl RequirerWrapper {
  /// `app` is the producer application, `category` the relation name.
  pub fn new(app: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      app: app.into(),
      category: category.into(),
    }
  }

  pub fn app(&self) -> &str {
    &self.app
  }

  pub fn category(&self) -> &str {
    &self.category
  }

  /// Publish `manifests` in this producer's bag of every relation.
  ///
  /// Only the leader may write relation data; on any other unit this logs and
  /// returns [`PushOutcome::NotLeader`] without touching `relations`.
  pub fn send_data(
    &self,
    relations: &mut Relations,
    leader: &dyn Leadership,
    manifests: &[Manifest],
  ) -> Result<PushOutcome, ProducerError> {
    if !leader.is_leader() {
      info!(
        app = %self.app,
        category = %self.category,
        "send_data called on a non-leader unit, no data sent"
      );
      return Ok(PushOutcome::NotLeader);
    }

    let payload = channel::encode(manifests)?;
    let mut sent = 0;
    for relation in relations.for_app_mut(&self.category, &self.app) {
      relation
        .bag_mut(&self.app)
        .insert(KUBERNETES_MANIFESTS_FIELD.to_string(), payload.clone());
      sent += 1;
    }

    debug!(
      app = %self.app,
      category = %self.category,
      manifests = manifests.len(),
      relations = sent,
      "manifests sent"
    );
    Ok(PushOutcome::Sent { relations: sent })
  }
}

/// Producer with a fixed manifest list.
///
/// Re-sends the list when leadership is gained (a relation may be created
/// before the leader is elected), when one of its relations is created, and on
/// any extra refresh event kinds it was configured with.
#[derive(Debug, Clone)]
pub struct ManifestsRequirer {
  wrapper: RequirerWrapper,
  manifests: Vec<Manifest>,
  refresh_events: Vec<EventKind>,
}

impl ManifestsRequirer {
  pub fn new(app: impl Into<String>, category: impl Into<String>, manifests: Vec<Manifest>) -> Self {
    Self {
      wrapper: RequirerWrapper::new(app, category),
      manifests,
      refresh_events: Vec::new(),
    }
  }

  /// Also re-send on these event kinds.
  pub fn with_refresh_events(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
    self.refresh_events.extend(kinds);
    self
  }

  /// Whether this producer re-sends on `event`.
  pub fn observes(&self, event: &Event) -> bool {
    let kind = event.kind();
    kind == EventKind::LeaderElected
      || kind == EventKind::RelationCreated(self.wrapper.category.clone())
      || self.refresh_events.contains(&kind)
  }

  /// Handle `event`, sending data if this producer observes it.
  ///
  /// Returns `None` for events the producer ignores.
  pub fn handle(
    &self,
    event: &Event,
    relations: &mut Relations,
    leader: &dyn Leadership,
  ) -> Result<Option<PushOutcome>, ProducerError> {
    if !self.observes(event) {
      return Ok(None);
    }
    self.wrapper.send_data(relations, leader, &self.manifests).map(Some)
  }
}
