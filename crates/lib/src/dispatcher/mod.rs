//! Reconciliation of every category against the destination.
//!
//! A [`Dispatcher`] owns one [`ManifestsProvider`] per configured category and
//! runs a pass over all of them whenever a relevant event arrives:
//!
//! 1. Guards: this unit must be the leader and the destination reachable
//! 2. Per category, in configured order: merge → validate → reconcile
//! 3. The first failing category stops the pass; earlier categories keep
//!    what was synced
//!
//! Which events start a pass is decided by an [`EventRouter`] built once in
//! [`Dispatcher::new`].

mod status;

pub use status::*;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DispatcherConfig;
use crate::events::{Event, EventKind, EventRouter};
use crate::leader::Leadership;
use crate::manifest::ManifestError;
use crate::provider::{ManifestsProvider, ProviderError, departing_producer_for};
use crate::relation::Relations;
use crate::sync::{self, Destination, SyncError, SyncReport};
use crate::util::hash::fingerprint;
use crate::validate::{collisions, identities};

/// Why a category stopped a pass.
#[derive(Debug, Error)]
pub enum CategoryError {
  #[error(transparent)]
  Provider(#[from] ProviderError),

  #[error("invalid manifest in {category}: {source}")]
  Schema {
    category: String,
    #[source]
    source: ManifestError,
  },

  #[error("duplicate manifest names in {category}: {}", .names.join(", "))]
  Collision { category: String, names: Vec<String> },

  #[error("failed to sync {category}: {source}")]
  Sync {
    category: String,
    #[source]
    source: SyncError,
  },
}

impl CategoryError {
  /// Status reported when this error stops a pass.
  pub fn status(&self) -> Status {
    match self {
      CategoryError::Sync { source, .. } if source.is_not_ready() => Status::Waiting(CONTAINER_NOT_READY.to_string()),
      CategoryError::Schema { .. } | CategoryError::Collision { .. } => {
        Status::Blocked(format!("Failed to process invalid manifest: {self}"))
      }
      CategoryError::Provider(_) | CategoryError::Sync { .. } => Status::Blocked(self.to_string()),
    }
  }
}

/// Result of syncing one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOutcome {
  pub category: String,
  /// Number of manifests in the desired set.
  pub manifests: usize,
  /// Short fingerprint of the desired set.
  pub fingerprint: String,
  pub report: SyncReport,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassOutcome {
  /// Hook name of the event that started the pass.
  pub event: String,
  pub status: Status,
  /// Categories synced before the pass ended, in order.
  pub categories: Vec<CategoryOutcome>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub failed_category: Option<String>,
}

impl PassOutcome {
  fn new(event: &Event, status: Status) -> Self {
    Self {
      event: event.hook_name(),
      status,
      categories: Vec::new(),
      failed_category: None,
    }
  }

  pub fn written(&self) -> usize {
    self.categories.iter().map(|c| c.report.written.len()).sum()
  }

  pub fn removed(&self) -> usize {
    self.categories.iter().map(|c| c.report.removed.len()).sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
  Reconcile,
  Remove,
  Updated(usize),
}

pub struct Dispatcher<D> {
  config: DispatcherConfig,
  providers: Vec<ManifestsProvider>,
  router: EventRouter<Route>,
  destination: D,
  leader: Box<dyn Leadership>,
}

impl<D: Destination> Dispatcher<D> {
  pub fn new(config: DispatcherConfig, destination: D, leader: impl Leadership + 'static) -> Self {
    let providers: Vec<_> = config
      .categories
      .iter()
      .map(|category| ManifestsProvider::new(&config.app_name, category))
      .collect();

    let mut router = EventRouter::new();
    for kind in [
      EventKind::Install,
      EventKind::UpgradeCharm,
      EventKind::ConfigChanged,
      EventKind::UpdateStatus,
    ] {
      router.register(kind, Route::Reconcile);
    }
    router.register(EventKind::Remove, Route::Remove);
    for (idx, provider) in providers.iter().enumerate() {
      for kind in provider.observed_kinds() {
        router.register(kind, Route::Updated(idx));
      }
    }

    Self {
      config,
      providers,
      router,
      destination,
      leader: Box::new(leader),
    }
  }

  pub fn config(&self) -> &DispatcherConfig {
    &self.config
  }

  pub fn destination(&self) -> &D {
    &self.destination
  }

  pub fn destination_mut(&mut self) -> &mut D {
    &mut self.destination
  }

  /// Whether `event` starts a pass.
  pub fn handles(&self, event: &Event) -> bool {
    self.router.is_routed(&event.kind())
  }

  /// Handle one event. Returns `None` if the event is not relevant.
  pub fn handle(&mut self, event: &Event, relations: &Relations) -> Option<PassOutcome> {
    let routes = self.router.route(event).to_vec();
    if routes.is_empty() {
      debug!(%event, "event not handled by the dispatcher");
      return None;
    }

    if routes.contains(&Route::Remove) {
      return Some(self.remove(event, relations));
    }

    for route in routes {
      if let Route::Updated(idx) = route
        && let Some(update) = self.providers.get(idx).and_then(|p| p.observe(event))
      {
        debug!(category = %update.category, relation_id = ?update.relation_id, "manifests updated");
      }
    }

    Some(self.pass(event, relations))
  }

  /// Run one reconciliation pass over every category.
  ///
  /// During a relation-broken event the departing producer's manifests are
  /// left out of that category's desired set.
  pub fn pass(&mut self, event: &Event, relations: &Relations) -> PassOutcome {
    if let Err(status) = self.check_guards() {
      info!(%event, %status, "pass stopped early");
      return PassOutcome::new(event, status);
    }

    let mut outcome = PassOutcome::new(event, Status::Active);
    for provider in &self.providers {
      let departing = departing_producer_for(event, provider.category());
      match sync_category(provider, relations, departing, &mut self.destination) {
        Ok(category) => outcome.categories.push(category),
        Err(err) => {
          outcome.status = err.status();
          outcome.failed_category = Some(provider.category().to_string());
          warn!(%event, category = %provider.category(), error = %err, "pass stopped early");
          return outcome;
        }
      }
    }

    info!(
      %event,
      written = outcome.written(),
      removed = outcome.removed(),
      "all categories synchronized"
    );
    outcome
  }

  /// Remove every dispatched manifest and category directory.
  ///
  /// A teardown pass runs first; categories are released whatever its status.
  fn remove(&mut self, event: &Event, relations: &Relations) -> PassOutcome {
    info!("{REMOVING_RESOURCES}");
    if let Err(status) = self.check_guards() {
      info!(%event, %status, "removal stopped early");
      return PassOutcome::new(event, status);
    }

    let teardown = self.pass(event, relations);
    debug!(status = %teardown.status, written = teardown.written(), "teardown pass finished");

    let mut outcome = PassOutcome::new(event, Status::Maintenance(RESOURCES_REMOVED.to_string()));
    for provider in &self.providers {
      let category = provider.category();
      match release_category(&mut self.destination, category) {
        Ok(report) => outcome.categories.push(CategoryOutcome {
          category: category.to_string(),
          manifests: 0,
          fingerprint: fingerprint(&[]).short().to_string(),
          report,
        }),
        Err(source) => {
          let err = CategoryError::Sync {
            category: category.to_string(),
            source,
          };
          outcome.status = err.status();
          outcome.failed_category = Some(category.to_string());
          warn!(%event, %category, error = %err, "removal stopped early");
          return outcome;
        }
      }
    }

    info!(removed = outcome.removed(), "{RESOURCES_REMOVED}");
    outcome
  }

  fn check_guards(&self) -> Result<(), Status> {
    if !self.leader.is_leader() {
      info!("not a leader, skipping");
      return Err(Status::Waiting(WAITING_FOR_LEADERSHIP.to_string()));
    }
    if !self.destination.can_connect() {
      return Err(Status::Waiting(CONTAINER_NOT_READY.to_string()));
    }
    Ok(())
  }
}

fn sync_category(
  provider: &ManifestsProvider,
  relations: &Relations,
  departing: Option<&str>,
  destination: &mut dyn Destination,
) -> Result<CategoryOutcome, CategoryError> {
  let category = provider.category();
  let manifests = provider.get_manifests(relations, departing)?;

  identities(&manifests).map_err(|source| CategoryError::Schema {
    category: category.to_string(),
    source,
  })?;
  let names = collisions(&manifests);
  if !names.is_empty() {
    debug!(%category, names = ?names, "manifest names in all relations must be unique");
    return Err(CategoryError::Collision {
      category: category.to_string(),
      names,
    });
  }

  let fingerprint = fingerprint(&manifests);
  debug!(%category, count = manifests.len(), fingerprint = %fingerprint.short(), "syncing desired set");

  let report = sync::reconcile(&manifests, destination, category).map_err(|source| CategoryError::Sync {
    category: category.to_string(),
    source,
  })?;

  Ok(CategoryOutcome {
    category: category.to_string(),
    manifests: manifests.len(),
    fingerprint: fingerprint.short().to_string(),
    report,
  })
}

fn release_category(destination: &mut dyn Destination, category: &str) -> Result<SyncReport, SyncError> {
  let report = sync::reconcile(&[], destination, category)?;
  destination.remove_dir(category)?;
  Ok(report)
}
